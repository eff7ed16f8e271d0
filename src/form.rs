//! State of the deploy form and the rules that turn it into a [`DeploymentSpec`].

use tracing::{debug, error, info};

use crate::client::DeploymentClient;
use crate::error::DeployError;
use crate::model::{DeploymentLabel, DeploymentSpec, PROTOCOLS, PortMapping};
use crate::navigation::{Navigator, View};
use crate::picker::NamespacePicker;

const APP_LABEL_KEY: &str = "app";
const VERSION_LABEL_KEY: &str = "version";

/// Tag of a container image, i.e. everything after the last `:`.
///
/// Registry ports are not special-cased: `registry:5000/app` yields `5000/app`.
pub fn derive_version_label(container_image: &str) -> String {
    container_image
        .rsplit_once(':')
        .map(|(_, version)| version.to_owned())
        .unwrap_or_default()
}

pub fn derive_app_label(name: &str) -> String {
    name.to_owned()
}

/// Form field a derived label reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    AppName,
    ImageVersion,
}

impl Derivation {
    pub fn compute(self, form: &DeploymentForm) -> String {
        match self {
            Derivation::AppName => derive_app_label(&form.name),
            Derivation::ImageVersion => derive_version_label(&form.container_image),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Value is computed from the form on every read and cannot be edited.
    Derived { key: String, source: Derivation },
    Freeform { key: String, value: String },
}

impl Label {
    pub fn derived(key: &str, source: Derivation) -> Self {
        Label::Derived {
            key: key.to_owned(),
            source,
        }
    }

    pub fn blank() -> Self {
        Label::Freeform {
            key: String::new(),
            value: String::new(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Label::Derived { key, .. } | Label::Freeform { key, .. } => key,
        }
    }

    pub fn value(&self, form: &DeploymentForm) -> String {
        match self {
            Label::Derived { source, .. } => source.compute(form),
            Label::Freeform { value, .. } => value.clone(),
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, Label::Freeform { .. })
    }

    fn is_blank(&self) -> bool {
        matches!(self, Label::Freeform { key, value } if key.is_empty() && value.is_empty())
    }

    fn to_api(&self, form: &DeploymentForm) -> Option<DeploymentLabel> {
        let value = self.value(form);
        if self.key().is_empty() || value.is_empty() {
            return None;
        }
        Some(DeploymentLabel {
            key: self.key().to_owned(),
            value,
        })
    }
}

/// How the namespace dialog ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Created(String),
    Dismissed,
}

impl From<Option<String>> for PickerOutcome {
    fn from(answer: Option<String>) -> Self {
        match answer {
            Some(name) if !name.is_empty() => PickerOutcome::Created(name),
            _ => PickerOutcome::Dismissed,
        }
    }
}

/// Namespaces the user can deploy into and the one currently chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceChoice {
    pub selected: Option<String>,
    pub available: Vec<String>,
}

impl NamespaceChoice {
    pub fn new(available: Vec<String>) -> Self {
        Self {
            selected: available.first().cloned(),
            available,
        }
    }

    /// Selects an existing namespace by position. Returns false if out of range.
    pub fn select(&mut self, index: usize) -> bool {
        match self.available.get(index) {
            Some(name) => {
                self.selected = Some(name.clone());
                true
            }
            None => false,
        }
    }

    /// State after the namespace dialog closes. A created namespace is appended and
    /// selected; otherwise the selection falls back to the first namespace.
    pub fn after_picker(mut self, outcome: PickerOutcome) -> Self {
        match outcome {
            PickerOutcome::Created(name) => {
                self.selected = Some(name.clone());
                self.available.push(name);
            }
            PickerOutcome::Dismissed => {
                self.selected = self.available.first().cloned();
            }
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentForm {
    pub name: String,
    pub container_image: String,
    pub container_command: String,
    pub container_command_args: String,
    pub replicas: u32,
    pub description: String,
    pub is_external: bool,
    pub port_mappings: Vec<PortMapping>,
    pub labels: Vec<Label>,
    pub namespaces: NamespaceChoice,
    show_more_options: bool,
}

impl DeploymentForm {
    pub fn new(namespaces: Vec<String>) -> Self {
        Self {
            name: String::new(),
            container_image: String::new(),
            container_command: String::new(),
            container_command_args: String::new(),
            replicas: 1,
            description: String::new(),
            is_external: false,
            port_mappings: vec![PortMapping::empty(PROTOCOLS[0])],
            labels: vec![
                Label::derived(APP_LABEL_KEY, Derivation::AppName),
                Label::derived(VERSION_LABEL_KEY, Derivation::ImageVersion),
                Label::blank(),
            ],
            namespaces: NamespaceChoice::new(namespaces),
            show_more_options: false,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespaces.selected.as_deref()
    }

    pub fn version_label(&self) -> String {
        derive_version_label(&self.container_image)
    }

    pub fn add_port_mapping(&mut self) -> &mut PortMapping {
        self.port_mappings.push(PortMapping::empty(PROTOCOLS[0]));
        let last = self.port_mappings.len() - 1;
        &mut self.port_mappings[last]
    }

    /// Writes into the trailing blank label and appends a new blank one.
    pub fn fill_blank_label(&mut self, key: &str, value: &str) {
        let filled = Label::Freeform {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        if self.labels.last().is_some_and(Label::is_blank) {
            self.labels.pop();
        }
        self.labels.push(filled);
        self.labels.push(Label::blank());
    }

    pub fn build_deployment_spec(&self) -> DeploymentSpec {
        DeploymentSpec {
            container_image: self.container_image.clone(),
            container_command: non_empty(&self.container_command),
            container_command_args: non_empty(&self.container_command_args),
            is_external: self.is_external,
            name: self.name.clone(),
            description: non_empty(&self.description),
            port_mappings: self
                .port_mappings
                .iter()
                .filter(|m| m.is_filled())
                .cloned()
                .collect(),
            replicas: self.replicas,
            namespace: self.namespaces.selected.clone(),
            labels: self
                .labels
                .iter()
                .filter_map(|label| label.to_api(self))
                .collect(),
        }
    }

    /// Sends the form to `client`. On success moves to the replica set list.
    pub async fn submit(
        &self,
        client: &dyn DeploymentClient,
        navigator: &dyn Navigator,
    ) -> Result<DeploymentSpec, DeployError> {
        let spec = self.build_deployment_spec();
        match client.save(&spec).await {
            Ok(saved) => {
                info!(
                    name = %saved.name,
                    namespace = ?saved.namespace,
                    "Successfully deployed application"
                );
                navigator.go(View::ReplicaSetList);
                Ok(saved)
            }
            Err(e) => {
                error!("Error deploying application: {e}");
                Err(e)
            }
        }
    }

    /// Opens the namespace dialog and applies its result. Cancelling is not an error.
    pub async fn request_namespace_creation(&mut self, picker: &dyn NamespacePicker) {
        let outcome = match picker.show(&self.namespaces.available).await {
            Ok(answer) => PickerOutcome::from(answer),
            Err(e) => {
                debug!("Namespace dialog dismissed: {e}");
                PickerOutcome::Dismissed
            }
        };
        self.namespaces = std::mem::take(&mut self.namespaces).after_picker(outcome);
    }

    pub fn toggle_more_options(&mut self) {
        self.show_more_options = !self.show_more_options;
    }

    pub fn is_more_options_shown(&self) -> bool {
        self.show_more_options
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{KubectlError, PickerError};

    struct FakeClient {
        rejection: Option<u16>,
        received: Mutex<Vec<DeploymentSpec>>,
    }

    impl FakeClient {
        fn accepting() -> Self {
            Self {
                rejection: None,
                received: Mutex::new(Vec::new()),
            }
        }

        fn rejecting(status: u16) -> Self {
            Self {
                rejection: Some(status),
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DeploymentClient for FakeClient {
        async fn save(&self, spec: &DeploymentSpec) -> Result<DeploymentSpec, DeployError> {
            self.received.lock().unwrap().push(spec.clone());
            match self.rejection {
                Some(status) => Err(DeployError::Rejected {
                    status,
                    message: "image not found".into(),
                }),
                None => Ok(spec.clone()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visits: AtomicUsize,
    }

    impl Navigator for RecordingNavigator {
        fn go(&self, view: View) {
            assert_eq!(view, View::ReplicaSetList);
            self.visits.fetch_add(1, Ordering::SeqCst);
        }
    }

    enum FakePicker {
        Answer(Option<String>),
        Fail,
    }

    #[async_trait]
    impl NamespacePicker for FakePicker {
        async fn show(&self, _existing: &[String]) -> Result<Option<String>, PickerError> {
            match self {
                FakePicker::Answer(answer) => Ok(answer.clone()),
                FakePicker::Fail => Err(PickerError::Kubectl(KubectlError::CommandFailed)),
            }
        }
    }

    fn namespaces() -> Vec<String> {
        vec!["default".to_string(), "kube-system".to_string()]
    }

    #[test]
    fn test_derive_version_label() {
        assert_eq!(derive_version_label("nginx:1.25"), "1.25");
        assert_eq!(derive_version_label("gcr.io/project/app:v2-beta"), "v2-beta");
        assert_eq!(derive_version_label("registry:5000/app"), "5000/app");
        assert_eq!(derive_version_label("registry:5000/app:latest"), "latest");
        assert_eq!(derive_version_label("nginx:"), "");
        assert_eq!(derive_version_label("nginx"), "");
        assert_eq!(derive_version_label(""), "");
    }

    #[test]
    fn test_new_form_defaults() {
        let form = DeploymentForm::new(namespaces());

        assert_eq!(form.replicas, 1);
        assert!(!form.is_external);
        assert!(!form.is_more_options_shown());
        assert_eq!(form.namespace(), Some("default"));
        assert_eq!(form.port_mappings, vec![PortMapping::empty("TCP")]);

        assert_eq!(form.labels.len(), 3);
        assert_eq!(form.labels[0].key(), "app");
        assert_eq!(form.labels[1].key(), "version");
        assert!(!form.labels[0].is_editable());
        assert!(form.labels[2].is_editable());
        assert_eq!(form.labels[2], Label::blank());
    }

    #[test]
    fn test_new_form_without_namespaces() {
        let form = DeploymentForm::new(Vec::new());
        assert_eq!(form.namespace(), None);
        assert!(form.build_deployment_spec().namespace.is_none());
    }

    #[test]
    fn test_derived_labels_follow_form() {
        let mut form = DeploymentForm::new(namespaces());
        form.name = "web".into();
        form.container_image = "nginx:1.25".into();
        assert_eq!(form.labels[0].value(&form), "web");
        assert_eq!(form.labels[1].value(&form), "1.25");

        form.name = "api".into();
        form.container_image = "nginx:1.27".into();
        assert_eq!(form.labels[0].value(&form), "api");
        assert_eq!(form.version_label(), "1.27");
        assert_eq!(form.labels[1].value(&form), "1.27");
    }

    #[test]
    fn test_build_spec_nulls_empty_optionals() {
        let mut form = DeploymentForm::new(namespaces());
        form.name = "web".into();
        form.container_image = "nginx".into();

        let spec = form.build_deployment_spec();
        assert_eq!(spec.container_command, None);
        assert_eq!(spec.container_command_args, None);
        assert_eq!(spec.description, None);

        form.container_command = "sleep 5".into();
        form.container_command_args = "--verbose".into();
        form.description = "Front end".into();

        let spec = form.build_deployment_spec();
        assert_eq!(spec.container_command.as_deref(), Some("sleep 5"));
        assert_eq!(spec.container_command_args.as_deref(), Some("--verbose"));
        assert_eq!(spec.description.as_deref(), Some("Front end"));
    }

    #[test]
    fn test_build_spec_drops_unfinished_port_mappings() {
        let mut form = DeploymentForm::new(namespaces());
        form.port_mappings[0].port = Some(80);

        let filled = form.add_port_mapping();
        filled.port = Some(80);
        filled.target_port = Some(8080);

        form.add_port_mapping();

        let spec = form.build_deployment_spec();
        assert_eq!(
            spec.port_mappings,
            vec![PortMapping {
                port: Some(80),
                target_port: Some(8080),
                protocol: "TCP".into(),
            }]
        );
        assert_eq!(form.port_mappings.len(), 3);
    }

    #[test]
    fn test_build_spec_filters_labels() {
        let mut form = DeploymentForm::new(namespaces());
        form.name = "web".into();
        form.container_image = "nginx".into();
        form.labels.push(Label::Freeform {
            key: "".into(),
            value: "x".into(),
        });
        form.labels.push(Label::Freeform {
            key: "tier".into(),
            value: "".into(),
        });
        form.labels.push(Label::Freeform {
            key: "tier".into(),
            value: "backend".into(),
        });

        let spec = form.build_deployment_spec();
        assert_eq!(
            spec.labels,
            vec![
                DeploymentLabel {
                    key: "app".into(),
                    value: "web".into(),
                },
                DeploymentLabel {
                    key: "tier".into(),
                    value: "backend".into(),
                },
            ]
        );
        assert_eq!(form.labels.len(), 6, "Filtering leaves the form untouched");
    }

    #[test]
    fn test_build_spec_is_idempotent() {
        let mut form = DeploymentForm::new(namespaces());
        form.name = "web".into();
        form.container_image = "nginx:1.25".into();
        form.replicas = 3;
        form.fill_blank_label("tier", "frontend");

        assert_eq!(form.build_deployment_spec(), form.build_deployment_spec());
    }

    #[test]
    fn test_fill_blank_label_keeps_trailing_blank() {
        let mut form = DeploymentForm::new(namespaces());
        form.fill_blank_label("tier", "frontend");
        form.fill_blank_label("team", "payments");

        assert_eq!(form.labels.len(), 5);
        assert_eq!(form.labels[2].key(), "tier");
        assert_eq!(form.labels[3].key(), "team");
        assert_eq!(form.labels[4], Label::blank());
    }

    #[test]
    fn test_namespace_choice_transitions() {
        let choice = NamespaceChoice::new(namespaces());

        let created = choice
            .clone()
            .after_picker(PickerOutcome::Created("team-a".into()));
        assert_eq!(created.selected.as_deref(), Some("team-a"));
        assert_eq!(created.available, vec!["default", "kube-system", "team-a"]);

        let mut chosen = choice.clone();
        assert!(chosen.select(1));
        assert!(!chosen.select(5));
        let dismissed = chosen.after_picker(PickerOutcome::Dismissed);
        assert_eq!(dismissed.selected.as_deref(), Some("default"));
        assert_eq!(dismissed.available, namespaces());

        let empty = NamespaceChoice::new(Vec::new()).after_picker(PickerOutcome::Dismissed);
        assert_eq!(empty.selected, None);
    }

    #[test]
    fn test_picker_outcome_from_answer() {
        assert_eq!(
            PickerOutcome::from(Some("team-a".to_string())),
            PickerOutcome::Created("team-a".into())
        );
        assert_eq!(PickerOutcome::from(Some(String::new())), PickerOutcome::Dismissed);
        assert_eq!(PickerOutcome::from(None), PickerOutcome::Dismissed);
    }

    #[tokio::test]
    async fn test_namespace_creation_selects_new_namespace() {
        let mut form = DeploymentForm::new(namespaces());
        assert_eq!(form.namespace(), Some("default"));

        let picker = FakePicker::Answer(Some("team-a".into()));
        form.request_namespace_creation(&picker).await;

        assert_eq!(form.namespace(), Some("team-a"));
        assert_eq!(
            form.namespaces.available,
            vec!["default", "kube-system", "team-a"]
        );
    }

    #[tokio::test]
    async fn test_namespace_creation_failure_falls_back() {
        let mut form = DeploymentForm::new(namespaces());
        form.namespaces.select(1);

        form.request_namespace_creation(&FakePicker::Fail).await;
        assert_eq!(form.namespace(), Some("default"));
        assert_eq!(form.namespaces.available, namespaces());

        form.namespaces.select(1);
        form.request_namespace_creation(&FakePicker::Answer(None)).await;
        assert_eq!(form.namespace(), Some("default"));
        assert_eq!(form.namespaces.available, namespaces());
    }

    #[tokio::test]
    async fn test_submit_navigates_once_on_success() {
        let mut form = DeploymentForm::new(namespaces());
        form.name = "web".into();
        form.container_image = "nginx:1.25".into();

        let client = FakeClient::accepting();
        let navigator = RecordingNavigator::default();

        let saved = form.submit(&client, &navigator).await.unwrap();
        assert_eq!(saved, form.build_deployment_spec());
        assert_eq!(navigator.visits.load(Ordering::SeqCst), 1);
        assert_eq!(client.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_failure_does_not_navigate() {
        let mut form = DeploymentForm::new(namespaces());
        form.name = "web".into();
        form.container_image = "nginx:missing".into();
        let before = form.build_deployment_spec();

        let client = FakeClient::rejecting(422);
        let navigator = RecordingNavigator::default();

        let err = form.submit(&client, &navigator).await.unwrap_err();
        match err {
            DeployError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "image not found");
            }
            other => panic!("Expected the client's rejection, got {other:?}"),
        }
        assert_eq!(navigator.visits.load(Ordering::SeqCst), 0);
        assert_eq!(form.build_deployment_spec(), before);
    }

    #[test]
    fn test_toggle_more_options() {
        let mut form = DeploymentForm::new(namespaces());
        form.toggle_more_options();
        assert!(form.is_more_options_shown());
        form.toggle_more_options();
        assert!(!form.is_more_options_shown());
    }
}
