use std::collections::BTreeMap;

use crate::{
    crds::{BuildSpec, Param},
    models::BuildStrategy,
};

pub const NAME_ANNOTATION: &str = "opendatahub.io/notebook-image-name";
pub const CREATOR_ANNOTATION: &str = "opendatahub.io/notebook-image-creator";
pub const DESCRIPTION_ANNOTATION: &str = "opendatahub.io/notebook-image-desc";

/// Ordered pipeline parameters for a build: identity first, then the
/// strategy-specific inputs. Assumes the build spec was validated upstream.
pub fn build_parameters(spec: &BuildSpec, annotations: &BTreeMap<String, String>) -> Vec<Param> {
    let annotation = |key: &str| annotations.get(key).cloned().unwrap_or_default();

    let mut params = vec![
        Param::string("name", annotation(NAME_ANNOTATION)),
        Param::string("creator", annotation(CREATOR_ANNOTATION)),
        Param::string("description", annotation(DESCRIPTION_ANNOTATION)),
    ];

    match spec.build_type {
        BuildStrategy::ImportImage => {
            params.push(Param::string("baseImage", &spec.from_image));
        }
        BuildStrategy::PackageList => {
            if spec.base_image.is_empty() {
                let runtime = &spec.runtime_environment;
                params.push(Param::string("osVersion", &runtime.os_version));
                params.push(Param::string("osName", &runtime.os_name));
                params.push(Param::string("pythonVersion", &runtime.python_version));
            } else {
                params.push(Param::string("baseImage", &spec.base_image));
            }

            if !spec.package_versions.is_empty() {
                params.push(Param::array("packages", spec.package_versions.clone()));
            }
        }
        BuildStrategy::GitRepository => {
            params.push(Param::string("url", &spec.repository));
            params.push(Param::string("ref", &spec.git_ref));
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::{ParamValue, RuntimeEnvironment};

    fn names(params: &[Param]) -> Vec<&str> {
        params.iter().map(|p| p.name.as_str()).collect()
    }

    fn annotations() -> BTreeMap<String, String> {
        BTreeMap::from([
            (NAME_ANNOTATION.to_string(), "Demo".to_string()),
            (CREATOR_ANNOTATION.to_string(), "jane".to_string()),
        ])
    }

    #[test]
    fn test_package_list_with_runtime_environment() {
        let spec = BuildSpec {
            build_type: BuildStrategy::PackageList,
            runtime_environment: RuntimeEnvironment {
                python_version: "3.9".into(),
                os_name: "ubi".into(),
                os_version: "9".into(),
            },
            package_versions: vec!["numpy".into()],
            ..Default::default()
        };

        let params = build_parameters(&spec, &annotations());

        assert_eq!(
            names(&params),
            vec![
                "name",
                "creator",
                "description",
                "osVersion",
                "osName",
                "pythonVersion",
                "packages"
            ]
        );
        assert_eq!(params[3], Param::string("osVersion", "9"));
        assert_eq!(params[6].value, ParamValue::Array(vec!["numpy".into()]));
    }

    #[test]
    fn test_package_list_with_base_image_and_no_packages() {
        let spec = BuildSpec {
            build_type: BuildStrategy::PackageList,
            base_image: "quay.io/base:1".into(),
            ..Default::default()
        };

        let params = build_parameters(&spec, &annotations());

        assert_eq!(names(&params), vec!["name", "creator", "description", "baseImage"]);
        assert_eq!(params[3], Param::string("baseImage", "quay.io/base:1"));
    }

    #[test]
    fn test_import_image_and_missing_annotation() {
        let spec = BuildSpec {
            build_type: BuildStrategy::ImportImage,
            from_image: "quay.io/demo:latest".into(),
            ..Default::default()
        };

        let params = build_parameters(&spec, &annotations());

        assert_eq!(params[0], Param::string("name", "Demo"));
        assert_eq!(params[2], Param::string("description", ""));
        assert_eq!(params[3], Param::string("baseImage", "quay.io/demo:latest"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_git_repository() {
        let spec = BuildSpec {
            build_type: BuildStrategy::GitRepository,
            repository: "https://github.com/org/repo".into(),
            git_ref: "main".into(),
            ..Default::default()
        };

        let params = build_parameters(&spec, &BTreeMap::new());

        assert_eq!(&names(&params)[3..], ["url", "ref"]);
        assert_eq!(params[4], Param::string("ref", "main"));
    }
}
