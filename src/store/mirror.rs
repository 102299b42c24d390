use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::types::{EffectRecord, ProjectRecord};
use crate::{
    config::StoreConfig,
    effects::EffectRegistry,
    error::{Result, StoreError},
    timeline::EffectWindow,
};

/// Map store records to effect windows, keeping their order
///
/// Records whose type the registry does not know are skipped with a warning.
pub fn records_to_windows(records: &[EffectRecord], registry: &EffectRegistry) -> Vec<EffectWindow> {
    records
        .iter()
        .filter_map(|record| match registry.resolve(&record.effect_type) {
            Some(kind) => Some(EffectWindow::new(kind, record.start_time, record.end_time)),
            None => {
                warn!(
                    "Skipping effect {} with unknown type '{}'",
                    record.id.as_deref().unwrap_or("<unnamed>"),
                    record.effect_type
                );
                None
            }
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    List(Vec<EffectRecord>),
    Project { effects: Vec<EffectRecord> },
}

/// Read effect records from a JSON file
///
/// Accepts a bare array of records or an object with an `effects` array
/// (such as a saved project).
pub fn load_windows_from_file<P: AsRef<Path>>(
    path: P,
    registry: &EffectRegistry,
) -> Result<Vec<EffectWindow>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let parsed: RecordFile =
        serde_json::from_str(&content).map_err(|e| StoreError::ParseFailed {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let records = match parsed {
        RecordFile::List(records) => records,
        RecordFile::Project { effects } => effects,
    };

    let windows = records_to_windows(&records, registry);
    info!("Loaded {} effect window(s) from {:?}", windows.len(), path);
    Ok(windows)
}

/// Read-only client for the project/effect store
#[derive(Debug, Clone)]
pub struct EffectStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl EffectStoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(StoreError::from)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn project_url(&self, project_id: &str) -> String {
        format!("{}/projects/{}", self.base_url, project_id)
    }

    /// `GET /projects/{id}`
    pub async fn fetch_project(&self, project_id: &str) -> Result<ProjectRecord> {
        let url = self.project_url(project_id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(StoreError::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::ProjectNotFound {
                project_id: project_id.to_string(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let project = response
            .json::<ProjectRecord>()
            .await
            .map_err(|e| StoreError::ParseFailed {
                source_name: url,
                reason: e.to_string(),
            })?;
        Ok(project)
    }

    /// The project's effect list as windows, in store order
    pub async fn fetch_windows(
        &self,
        project_id: &str,
        registry: &EffectRegistry,
    ) -> Result<Vec<EffectWindow>> {
        let project = self.fetch_project(project_id).await?;
        let windows = records_to_windows(&project.effects, registry);

        info!(
            "Project '{}': {} effect window(s)",
            if project.name.is_empty() { &project.id } else { &project.name },
            windows.len()
        );
        Ok(windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use tempfile::tempdir;

    fn record(effect_type: &str, start: f64, end: f64) -> EffectRecord {
        EffectRecord {
            id: None,
            effect_type: effect_type.to_string(),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn test_records_keep_order_and_skip_unknown() {
        let registry = EffectRegistry::new();
        let records = vec![
            record("invert", 0.0, 4.0),
            record("vhs", 0.0, -1.0),
            record("Sepia", 2.0, -1.0),
        ];

        let windows = records_to_windows(&records, &registry);
        assert_eq!(
            windows,
            vec![
                EffectWindow::new(EffectKind::Invert, 0.0, 4.0),
                EffectWindow::new(EffectKind::Sepia, 2.0, -1.0),
            ]
        );
    }

    #[test]
    fn test_load_from_array_and_project_files() {
        let dir = tempdir().unwrap();
        let registry = EffectRegistry::new();

        let list = dir.path().join("effects.json");
        std::fs::write(&list, r#"[{"type":"blur","start_time":1,"end_time":2}]"#).unwrap();
        let windows = load_windows_from_file(&list, &registry).unwrap();
        assert_eq!(windows, vec![EffectWindow::new(EffectKind::Blur, 1.0, 2.0)]);

        let project = dir.path().join("project.json");
        std::fs::write(
            &project,
            r#"{"id":"p","effects":[{"type":"segmentation"},{"type":"grayscale","start_time":3}]}"#,
        )
        .unwrap();
        let windows = load_windows_from_file(&project, &registry).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].kind, EffectKind::Segmentation);
        assert!(windows[1].is_unbounded());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_windows_from_file(&path, &EffectRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::BackdropError::Store(StoreError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_project_url() {
        let config = StoreConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..StoreConfig::default()
        };
        let client = EffectStoreClient::new(&config).unwrap();
        assert_eq!(client.project_url("abc"), "http://localhost:8080/projects/abc");
    }
}
