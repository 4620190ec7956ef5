/// What should answer a completion request.
///
/// Route to an agent when the call must hit one exact persona with its
/// pinned configuration (tools, prompts, model). Route to a service when any
/// agent currently backing that named provider will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A stable agent identifier.
    Agent(String),
    /// A service name or identifier, e.g. "openai" or "anthropic".
    Service(String),
}

impl Target {
    pub fn agent<S: Into<String>>(id: S) -> Self {
        Target::Agent(id.into())
    }

    pub fn service<S: Into<String>>(name: S) -> Self {
        Target::Service(name.into())
    }

    /// Path segment naming this routing kind
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Target::Agent(_) => "agent",
            Target::Service(_) => "service",
        }
    }

    pub(crate) fn id(&self) -> &str {
        match self {
            Target::Agent(id) | Target::Service(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_segments() {
        let target = Target::agent("bot123");
        assert_eq!(target.kind(), "agent");
        assert_eq!(target.id(), "bot123");

        let target = Target::service("anthropic");
        assert_eq!(target.kind(), "service");
        assert_eq!(target.id(), "anthropic");
    }
}
