//! Configuration for a positioning pass

use std::fmt;

use crate::middleware::Middleware;
use crate::placement::Placement;
use crate::platform::{Platform, Strategy};

/// Inputs of [`compute_position`](super::compute_position) besides the two elements
pub struct ComputeConfig<'a, P: Platform> {
    /// Requested placement (default `bottom`)
    pub placement: Placement,

    /// Positioning scheme (default `absolute`)
    pub strategy: Strategy,

    /// Middleware in execution order; `None` entries are skipped, which
    /// lets callers include middleware conditionally
    pub middleware: Vec<Option<Box<dyn Middleware<P> + 'a>>>,

    /// Host measurement
    pub platform: &'a P,
}

impl<'a, P: Platform> ComputeConfig<'a, P> {
    /// Create a configuration with default placement and strategy
    pub fn new(platform: &'a P) -> Self {
        Self {
            placement: Placement::default(),
            strategy: Strategy::default(),
            middleware: Vec::new(),
            platform,
        }
    }

    /// Set the requested placement
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the positioning strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Append a middleware
    pub fn with_middleware(mut self, middleware: impl Middleware<P> + 'a) -> Self {
        self.middleware.push(Some(Box::new(middleware)));
        self
    }

    /// Append a middleware that may be absent
    pub fn with_optional_middleware<M: Middleware<P> + 'a>(mut self, middleware: Option<M>) -> Self {
        self.middleware
            .push(middleware.map(|m| Box::new(m) as Box<dyn Middleware<P> + 'a>));
        self
    }
}

impl<P: Platform> fmt::Debug for ComputeConfig<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<Option<&str>> = self
            .middleware
            .iter()
            .map(|m| m.as_ref().map(|m| m.name()))
            .collect();
        f.debug_struct("ComputeConfig")
            .field("placement", &self.placement)
            .field("strategy", &self.strategy)
            .field("middleware", &names)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{offset, Offset};
    use crate::platform::{Scene, SceneBuilder};

    fn scene() -> Scene {
        SceneBuilder::new(100.0, 100.0).build().unwrap()
    }

    #[test]
    fn test_default_config() {
        let scene = scene();
        let config = ComputeConfig::new(&scene);
        assert_eq!(config.placement, Placement::BOTTOM);
        assert_eq!(config.strategy, Strategy::Absolute);
        assert!(config.middleware.is_empty());
    }

    #[test]
    fn test_builder_pattern() {
        let scene = scene();
        let config = ComputeConfig::new(&scene)
            .with_placement(Placement::LEFT_END)
            .with_strategy(Strategy::Fixed)
            .with_middleware(offset(4.0))
            .with_optional_middleware(None::<Offset>);

        assert_eq!(config.placement, Placement::LEFT_END);
        assert_eq!(config.strategy, Strategy::Fixed);
        assert_eq!(config.middleware.len(), 2);
        assert!(config.middleware[1].is_none());
        assert!(format!("{:?}", config).contains("Some(\"offset\")"));
    }
}
