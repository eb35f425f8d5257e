use crate::hooks::{HandlerDeps, HandlerMap, HandlersFactory};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerFactoryError {
    #[error("handlers defined for unknown routes: {}", .0.join(", "))]
    UnknownRoutes(Vec<String>),
}

/// Run the descriptor's handlers factory and normalize its output to one record per route.
pub fn create_handler_map(
    factory: Option<&HandlersFactory>,
    deps: &HandlerDeps,
    route_names: &[String],
) -> Result<HandlerMap, HandlerFactoryError> {
    let mut produced = factory.map(|f| f.build(deps)).unwrap_or_default();

    let unknown: Vec<String> = produced
        .keys()
        .filter(|k| !route_names.contains(k))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(HandlerFactoryError::UnknownRoutes(unknown));
    }

    Ok(route_names
        .iter()
        .map(|name| {
            let hooks = produced.remove(name).unwrap_or_default();
            (name.clone(), hooks)
        })
        .collect())
}
