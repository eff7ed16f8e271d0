use std::process::Command;

use crate::error::KubectlError;

const KUBECTL: &str = "kubectl";

type Result<T> = std::result::Result<T, KubectlError>;

pub mod context {
    use super::*;

    pub fn current() -> Result<String> {
        let output = Command::new(KUBECTL)
            .args(["config", "current-context"])
            .output()?;
        if !output.status.success() {
            return Err(KubectlError::CommandFailed);
        }

        Ok(String::from_utf8(output.stdout)?.trim().into())
    }
}

pub mod namespace {
    use super::*;
    use crate::model::{KubectlList, Namespace};

    pub fn get() -> Result<Vec<Namespace>> {
        let output = Command::new(KUBECTL)
            .args(["get", "namespaces", "--output=json"])
            .output()?;

        if !output.status.success() {
            return Err(KubectlError::CommandFailed);
        }

        let output = String::from_utf8(output.stdout)?;

        Ok(serde_json::from_str::<KubectlList<Namespace>>(&output)?.items)
    }

    pub fn create(name: &str) -> Result<()> {
        let output = Command::new(KUBECTL)
            .args(["create", "namespace", name])
            .output()?;
        if !output.status.success() {
            Err(KubectlError::CommandFailed)
        } else {
            Ok(())
        }
    }
}

pub mod replicaset {
    use super::*;
    use crate::model::{KubectlList, ReplicaSet};

    pub fn get(namespace: Option<&str>) -> Result<Vec<ReplicaSet>> {
        let mut command = Command::new(KUBECTL);
        if let Some(namespace) = namespace {
            command.args(["--namespace", namespace]);
        }
        let output = command
            .args(["get", "replicasets", "--output=json"])
            .output()?;

        if !output.status.success() {
            return Err(KubectlError::CommandFailed);
        }

        let output = String::from_utf8(output.stdout)?;

        Ok(serde_json::from_str::<KubectlList<ReplicaSet>>(&output)?.items)
    }
}
