//! Looks up the resources published for an HDX dataset.
//!
//! HDX runs CKAN, so a dataset's metadata (including its resource list) is
//! available from the `package_show` action of the read-only action API.

use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    config::HdxConfig,
    error::{RainfallError, Result},
    resource::ResourceDescriptor,
};

/// Anonymous, read-only HDX client.
pub struct Hdx {
    client: Client,
    site: String,
}

#[derive(Debug, Deserialize)]
struct PackageShow {
    success: bool,
    result: Option<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    #[serde(default)]
    resources: Vec<PackageResource>,
}

#[derive(Debug, Deserialize)]
struct PackageResource {
    name: String,
    download_url: String,
}

impl Hdx {
    /// Builds the client used for every metadata request of the session.
    pub fn connect(config: &HdxConfig) -> Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Hdx {
            client,
            site: config.site.trim_end_matches('/').to_string(),
        })
    }

    pub fn package_url(&self, dataset_id: &str) -> String {
        format!("{}/api/3/action/package_show?id={}", self.site, dataset_id)
    }

    /// Returns the dataset's resources in published order.
    pub async fn locate(&self, dataset_id: &str) -> Result<Vec<ResourceDescriptor>> {
        let url = self.package_url(dataset_id);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RainfallError::NotFound(dataset_id.to_string()));
        }
        if !status.is_success() {
            return Err(RainfallError::Transport(format!(
                "metadata request for `{}` failed: {}",
                dataset_id, status
            )));
        }

        let body = response.text().await?;
        let resources = parse_package_show(dataset_id, &body)?;
        info!("Located {} resources for `{}`", resources.len(), dataset_id);

        Ok(resources)
    }
}

fn parse_package_show(dataset_id: &str, body: &str) -> Result<Vec<ResourceDescriptor>> {
    let package: PackageShow = serde_json::from_str(body).map_err(|e| {
        RainfallError::Transport(format!("malformed metadata for `{}`: {}", dataset_id, e))
    })?;

    match package {
        PackageShow {
            success: true,
            result: Some(package),
        } => package
            .resources
            .iter()
            .map(|r| ResourceDescriptor::new(&r.name, &r.download_url))
            .collect(),
        _ => Err(RainfallError::NotFound(dataset_id.to_string())),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE: &str = r#"{
        "help": "https://data.humdata.org/api/3/action/help_show?name=package_show",
        "success": true,
        "result": {
            "name": "cod-ab-yem",
            "resources": [
                {
                    "name": "yem_adm_govyem_cso_ochayemen_20191002_GPKG.zip",
                    "download_url": "https://data.humdata.org/dataset/a1/resource/b2/download/yem_adm_govyem_cso_ochayemen_20191002_GPKG.zip",
                    "format": "Geopackage"
                },
                {
                    "name": "yem_adm_govyem_cso_ochayemen_20191002_TOPOJSON.zip",
                    "download_url": "https://data.humdata.org/dataset/a1/resource/c3/download/yem_adm_govyem_cso_ochayemen_20191002_TOPOJSON.zip",
                    "format": "TopoJSON"
                }
            ]
        }
    }"#;

    #[test]
    fn should_parse_resources_in_order() {
        let resources = parse_package_show("cod-ab-yem", PACKAGE).unwrap();

        assert_eq!(resources.len(), 2);
        assert_eq!(
            resources[0].name,
            "yem_adm_govyem_cso_ochayemen_20191002_GPKG.zip"
        );
        assert_eq!(resources[1].url.scheme(), "https");
        assert_eq!(resources[1].url.host_str(), Some("data.humdata.org"));
    }

    #[test]
    fn should_report_unsuccessful_lookup_as_not_found() {
        let body = r#"{"success": false, "error": {"message": "Not found", "__type": "Not Found Error"}}"#;
        let result = parse_package_show("yem-nothing", body);

        assert!(matches!(result, Err(RainfallError::NotFound(id)) if id == "yem-nothing"));
    }

    #[test]
    fn should_report_garbage_as_transport_error() {
        let result = parse_package_show("cod-ab-yem", "<html>gateway timeout</html>");
        assert!(matches!(result, Err(RainfallError::Transport(_))));
    }

    #[test]
    fn should_reject_malformed_download_url() {
        let body = r#"{"success": true, "result": {"resources": [{"name": "a.csv", "download_url": "not a url"}]}}"#;
        let result = parse_package_show("x", body);

        assert!(matches!(result, Err(RainfallError::Transport(_))));
    }

    #[tokio::test]
    async fn should_report_unreachable_site_as_transport_error() {
        let hdx = Hdx::connect(&HdxConfig {
            site: "http://127.0.0.1:9".to_string(),
            user_agent: "test".to_string(),
        })
        .unwrap();

        let result = hdx.locate("yem-rainfall-subnational").await;
        assert!(matches!(result, Err(RainfallError::Transport(_))));
    }

    #[test]
    fn should_build_package_url() {
        let hdx = Hdx::connect(&HdxConfig {
            site: "https://data.humdata.org/".to_string(),
            user_agent: "test".to_string(),
        })
        .unwrap();

        assert_eq!(
            hdx.package_url("yem-rainfall-subnational"),
            "https://data.humdata.org/api/3/action/package_show?id=yem-rainfall-subnational"
        );
    }
}
