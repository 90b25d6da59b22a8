//! Drift detection
//!
//! Structural comparison of a provider snapshot against the desired spec.
//! Each difference becomes one human-readable line; an empty list means the
//! resource matches. Collections of ids compare as sets.

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::traits::{DbCluster, DbInstance, DbParameterGroup, DbSubnetGroup};
use crate::types::{ClusterSpec, InstanceSpec, ParameterGroupSpec, SubnetGroupSpec};

/// Accumulates mismatch descriptions
#[derive(Debug, Default)]
pub struct Mismatches {
    items: Vec<String>,
}

impl Mismatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mismatch when `desired != actual`
    pub fn compare<T>(&mut self, field: &str, desired: T, actual: T) -> &mut Self
    where
        T: PartialEq + Display,
    {
        if desired != actual {
            self.items
                .push(format!("{} mismatch: desired '{}', actual '{}'", field, desired, actual));
        }
        self
    }

    /// Compare only when the spec declares the field
    pub fn declared(&mut self, field: &str, desired: Option<&str>, actual: Option<&str>) -> &mut Self {
        if let Some(desired) = desired {
            self.compare(field, desired, actual.unwrap_or(""));
        }
        self
    }

    /// Record a mismatch when the two collections differ as sets
    pub fn set<S: AsRef<str>>(&mut self, field: &str, desired: &[S], actual: &[S]) -> &mut Self {
        let desired: BTreeSet<&str> = desired.iter().map(AsRef::as_ref).collect();
        let actual: BTreeSet<&str> = actual.iter().map(AsRef::as_ref).collect();
        if desired != actual {
            let missing: Vec<&str> = desired.difference(&actual).copied().collect();
            let extra: Vec<&str> = actual.difference(&desired).copied().collect();
            self.items.push(format!(
                "{} mismatch: missing [{}], unexpected [{}]",
                field,
                missing.join(", "),
                extra.join(", ")
            ));
        }
        self
    }

    /// Record a free-form mismatch
    pub fn push(&mut self, description: String) -> &mut Self {
        self.items.push(description);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Cluster drift. The master password is not observable and never compared.
pub fn cluster(existing: &DbCluster, spec: &ClusterSpec) -> Vec<String> {
    let mut m = Mismatches::new();
    m.compare("identifier", spec.id.as_str(), existing.identifier.as_str())
        .compare("engine", spec.engine.as_str(), existing.engine.as_str())
        .declared(
            "engine_version",
            spec.engine_version.as_deref(),
            Some(existing.engine_version.as_str()),
        )
        .compare(
            "master_username",
            spec.master_username.as_str(),
            existing.master_username.as_str(),
        )
        .set(
            "security_group_ids",
            &spec.security_group_ids,
            &existing.vpc_security_group_ids,
        )
        .declared(
            "subnet_group_name",
            spec.subnet_group_name.as_deref(),
            existing.db_subnet_group.as_deref(),
        )
        .declared(
            "parameter_group_name",
            spec.parameter_group_name.as_deref(),
            existing.db_cluster_parameter_group.as_deref(),
        );
    m.into_vec()
}

pub fn instance(existing: &DbInstance, spec: &InstanceSpec) -> Vec<String> {
    let mut m = Mismatches::new();
    m.compare("identifier", spec.id.as_str(), existing.identifier.as_str())
        .compare(
            "cluster_id",
            spec.cluster_id.as_str(),
            existing.cluster_identifier.as_str(),
        )
        .compare("engine", spec.engine.as_str(), existing.engine.as_str())
        .compare(
            "instance_class",
            spec.instance_class.as_str(),
            existing.instance_class.as_str(),
        )
        .declared(
            "parameter_group_name",
            spec.parameter_group_name.as_deref(),
            existing.db_parameter_group.as_deref(),
        );
    m.into_vec()
}

/// Shared by DB and DB cluster parameter groups
pub fn parameter_group(existing: &DbParameterGroup, spec: &ParameterGroupSpec) -> Vec<String> {
    let mut m = Mismatches::new();
    m.compare("name", spec.name.as_str(), existing.name.as_str())
        .compare("family", spec.family.as_str(), existing.family.as_str())
        .compare(
            "description",
            spec.description.as_str(),
            existing.description.as_str(),
        );
    for parameter in &spec.parameters {
        match existing.parameters.get(&parameter.name) {
            Some(actual) => {
                m.compare(
                    &format!("parameter {}", parameter.name),
                    parameter.value.as_str(),
                    actual.as_str(),
                );
            }
            None => {
                m.push(format!("parameter {} is not set", parameter.name));
            }
        }
    }
    m.into_vec()
}

pub fn subnet_group(existing: &DbSubnetGroup, spec: &SubnetGroupSpec) -> Vec<String> {
    let mut m = Mismatches::new();
    m.compare("name", spec.name.as_str(), existing.name.as_str())
        .compare(
            "description",
            spec.description.as_str(),
            existing.description.as_str(),
        )
        .set("subnet_ids", &spec.subnet_ids, &existing.subnet_ids);
    m.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Parameter;
    use std::collections::BTreeMap;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn cluster_pair() -> (DbCluster, ClusterSpec) {
        let existing = DbCluster {
            identifier: "db1".to_string(),
            status: "available".to_string(),
            engine: "aurora-postgresql".to_string(),
            engine_version: "15.4".to_string(),
            master_username: "admin".to_string(),
            vpc_security_group_ids: strings(&["sg-2", "sg-1"]),
            db_subnet_group: Some("private".to_string()),
            db_cluster_parameter_group: Some("default.aurora-postgresql15".to_string()),
            endpoint: None,
            reader_endpoint: None,
        };
        let spec = ClusterSpec {
            id: "db1".to_string(),
            engine: "aurora-postgresql".to_string(),
            engine_version: None,
            master_username: "admin".to_string(),
            master_user_password: "never-compared".to_string(),
            security_group_ids: strings(&["sg-1", "sg-2"]),
            subnet_group_name: Some("private".to_string()),
            parameter_group_name: None,
        };
        (existing, spec)
    }

    #[test]
    fn security_groups_compare_as_sets() {
        let (existing, spec) = cluster_pair();
        assert!(cluster(&existing, &spec).is_empty());
    }

    #[test]
    fn undeclared_optional_fields_are_not_drift() {
        let (mut existing, spec) = cluster_pair();
        assert_eq!(spec.engine_version, None);
        assert_eq!(spec.parameter_group_name, None);
        existing.engine_version = "16.2".to_string();
        existing.db_cluster_parameter_group = Some("custom-params".to_string());

        assert!(cluster(&existing, &spec).is_empty());
    }

    #[test]
    fn declared_version_and_group_set_changes_are_drift() {
        let (existing, mut spec) = cluster_pair();
        spec.engine_version = Some("16.1".to_string());
        spec.security_group_ids = strings(&["sg-1", "sg-3"]);

        let mismatches = cluster(&existing, &spec);
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches[0].starts_with("engine_version mismatch"));
        assert_eq!(
            mismatches[1],
            "security_group_ids mismatch: missing [sg-3], unexpected [sg-2]"
        );
    }

    #[test]
    fn instance_class_change_is_drift() {
        let existing = DbInstance {
            identifier: "db1-a".to_string(),
            cluster_identifier: "db1".to_string(),
            status: "available".to_string(),
            engine: "aurora-postgresql".to_string(),
            instance_class: "db.r6g.large".to_string(),
            db_parameter_group: Some("default".to_string()),
            endpoint: None,
        };
        let spec = InstanceSpec {
            id: "db1-a".to_string(),
            cluster_id: "db1".to_string(),
            engine: "aurora-postgresql".to_string(),
            instance_class: "db.r6g.xlarge".to_string(),
            allocated_storage: None,
            parameter_group_name: None,
        };
        assert_eq!(
            instance(&existing, &spec),
            vec!["instance_class mismatch: desired 'db.r6g.xlarge', actual 'db.r6g.large'"]
        );
    }

    #[test]
    fn parameter_values_must_be_present_and_equal() {
        let existing = DbParameterGroup {
            name: "pg15".to_string(),
            family: "aurora-postgresql15".to_string(),
            description: "params".to_string(),
            parameters: BTreeMap::from([("work_mem".to_string(), "4096".to_string())]),
        };
        let spec = ParameterGroupSpec {
            name: "pg15".to_string(),
            family: "aurora-postgresql15".to_string(),
            description: "params".to_string(),
            parameters: vec![
                Parameter::new("work_mem", "8192"),
                Parameter::new("log_min_duration_statement", "500"),
            ],
        };
        let mismatches = parameter_group(&existing, &spec);
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches[1].contains("log_min_duration_statement is not set"));
    }

    #[test]
    fn subnet_order_is_irrelevant() {
        let existing = DbSubnetGroup {
            name: "private".to_string(),
            description: "d".to_string(),
            subnet_ids: strings(&["subnet-b", "subnet-a"]),
            status: "Complete".to_string(),
        };
        let spec = SubnetGroupSpec {
            name: "private".to_string(),
            description: "d".to_string(),
            subnet_ids: strings(&["subnet-a", "subnet-b"]),
        };
        assert!(subnet_group(&existing, &spec).is_empty());
    }
}
