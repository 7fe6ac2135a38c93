/// Knobs for [`Classifier`](crate::Classifier).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Reject signatures that repeat a singleton kind (context, event time and
    /// type token parameters; error and event time returns). When off, the
    /// repetition is logged and the first occurrence wins in lookups.
    pub strict_singletons: bool,
}

impl ClassifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with singleton enforcement turned on.
    pub fn strict() -> Self {
        Self {
            strict_singletons: true,
        }
    }

    pub fn with_strict_singletons(mut self, strict: bool) -> Self {
        self.strict_singletons = strict;
        self
    }
}
