pub type GlobeResult<T> = Result<T, GlobeError>;

/// Errors surfaced by the globe engine and its plugins.
///
/// Draw-time failures never cross a draw pass boundary; they are recorded as
/// diagnostics on the engine and the offending hook is skipped for that pass.
/// Init-time failures propagate to the caller of `draw`.
#[derive(thiserror::Error, Debug)]
pub enum GlobeError {
    #[error("plugin `{plugin}` failed to initialize: {source}")]
    Init {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("coordinate out of range: longitude {lon}, latitude {lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },

    #[error("draw hook of plugin `{plugin}` failed: {source}")]
    DrawHook {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not load `{resource}`: {source}")]
    DataLoad {
        resource: String,
        #[source]
        source: anyhow::Error,
    },
}

impl GlobeError {
    pub fn init(plugin: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Init {
            plugin: plugin.into(),
            source,
        }
    }

    pub fn data_load(resource: impl Into<String>, source: anyhow::Error) -> Self {
        Self::DataLoad {
            resource: resource.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_plugin() {
        let err = GlobeError::init("pings", anyhow::anyhow!("boom"));
        let text = err.to_string();
        assert!(text.contains("pings"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn display_names_the_resource() {
        let err = GlobeError::data_load("data/ne_110m_land.json", anyhow::anyhow!("no such file"));
        let text = err.to_string();
        assert!(text.contains("ne_110m_land.json"));
        assert!(text.contains("no such file"));
    }

    #[test]
    fn invalid_coordinate_reports_both_axes() {
        let err = GlobeError::InvalidCoordinate { lon: 181.0, lat: 0.0 };
        assert!(err.to_string().contains("181"));
    }
}
