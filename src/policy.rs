use chrono::{DateTime, Utc};

/// A usage policy attached to a signed request: an ordered, non-empty sequence of statements.
///
/// Policies are constructed fresh by [`decode`][crate::codec::decode] for each validation call
/// and are immutable afterwards; nothing is persisted between calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    /// The statements of the policy, in the order they appeared in the policy document.
    statements: Vec<PolicyStatement>,
}

impl Policy {
    /// Create a new, empty policy. A policy must have at least one statement added via
    /// [`add_statement`][Self::add_statement] before it is usable for validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement to the policy, preserving order.
    pub fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    /// The statements of the policy, in document order.
    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }
}

impl From<Vec<PolicyStatement>> for Policy {
    fn from(statements: Vec<PolicyStatement>) -> Self {
        Self {
            statements,
        }
    }
}

/// A single statement of a usage policy: the resource it covers and the conditions under which
/// access is granted.
///
/// Epoch-seconds values from the wire are converted to [`DateTime<Utc>`] at the codec boundary;
/// this type never sees raw epoch integers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyStatement {
    /// Pattern identifying the protected URL. May contain `*` and `?` wildcards.
    pub resource: String,

    /// The expiration bound. Requests at or after this instant are expired.
    pub date_less_than: DateTime<Utc>,

    /// Optional lower bound: requests before this instant are denied.
    pub date_greater_than: Option<DateTime<Utc>>,

    /// Optional source address restriction, either a bare IP address or CIDR notation
    /// (e.g. `192.0.2.0/24`).
    pub ip_address: Option<String>,
}

impl PolicyStatement {
    /// Create a statement covering `resource` that expires at `date_less_than`, with no other
    /// conditions.
    pub fn new(resource: impl Into<String>, date_less_than: DateTime<Utc>) -> Self {
        Self {
            resource: resource.into(),
            date_less_than,
            date_greater_than: None,
            ip_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{Policy, PolicyStatement},
        chrono::{TimeZone, Utc},
    };

    #[test_log::test]
    fn test_statement_order_preserved() {
        let expires = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut policy = Policy::new();
        policy.add_statement(PolicyStatement::new("http://localhost/a.html", expires));
        policy.add_statement(PolicyStatement::new("http://localhost/b.html", expires));

        let resources: Vec<&str> = policy.statements().iter().map(|s| s.resource.as_str()).collect();
        assert_eq!(resources, vec!["http://localhost/a.html", "http://localhost/b.html"]);

        let from_vec = Policy::from(policy.statements().to_vec());
        assert_eq!(from_vec, policy);
    }
}
