mod client;
mod error;
mod form;
mod kubectl;
mod model;
mod navigation;
mod picker;
mod selection;
mod validation;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use console::{Term, style};
use dialoguer::{Confirm, FuzzySelect, Input, Select, theme::Theme};
use indicatif::ProgressBar;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::HttpDeploymentClient;
use crate::error::MainError;
use crate::form::DeploymentForm;
use crate::kubectl::{context, namespace};
use crate::model::{PROTOCOLS, PortMapping};
use crate::navigation::TerminalNavigator;
use crate::picker::PromptNamespacePicker;
use crate::selection::{DefaultSelections, Selection, resolve_api_url};
use crate::validation::{
    parse_port, validate_app_name, validate_container_image, validate_port, validate_replicas,
};

type Result<T> = std::result::Result<T, MainError>;

const CREATE_NAMESPACE_ITEM: &str = "+ Create a new namespace";

#[derive(Parser, Debug)]
#[command(
    name = "kdeploy",
    version,
    about = "Deploy a container image to Kubernetes interactively"
)]
struct Args {
    /// Base URL of the deployment API
    #[arg(long, env = "KDEPLOY_API_URL")]
    api_url: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "KDEPLOY_LOG", default_value = "warn")]
    log_level: String,

    /// Where remembered selections are stored
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config_file(args: &Args) -> Result<PathBuf> {
    if let Some(path) = &args.config {
        return Ok(path.clone());
    }
    let config_dir = dirs::config_dir()
        .ok_or(MainError::NoConfigDir)?
        .join(env!("CARGO_PKG_NAME"));
    if !fs::exists(&config_dir)? {
        eprintln!(
            "Creating config directory {}",
            config_dir.to_str().unwrap_or("<unknown>")
        );
        fs::create_dir_all(&config_dir)?;
    }
    Ok(config_dir.join("config.json"))
}

fn load_namespaces() -> Vec<String> {
    let bar = ProgressBar::new_spinner().with_message("Getting available namespaces...");
    bar.enable_steady_tick(Duration::from_millis(100));
    let namespaces = namespace::get();
    bar.finish_and_clear();

    match namespaces {
        Ok(n) => n.into_iter().map(|ns| ns.metadata.name).collect(),
        Err(e) => {
            warn!("Could not list namespaces: {e}");
            Vec::new()
        }
    }
}

fn prompt_app(
    theme: &dyn Theme,
    form: &mut DeploymentForm,
    default_image: Option<String>,
) -> Result<()> {
    form.name = Input::<String>::with_theme(theme)
        .with_prompt("App name")
        .validate_with(|input: &String| validate_app_name(input))
        .interact_text()?;

    let mut prompt = Input::<String>::with_theme(theme)
        .with_prompt("Container image")
        .validate_with(|input: &String| validate_container_image(input));
    if let Some(image) = default_image {
        prompt = prompt.default(image);
    }
    form.container_image = prompt.interact_text()?;
    if form.version_label().is_empty() {
        warn!(
            "Image {} has no tag, the version label will be left out",
            form.container_image
        );
    }

    form.replicas = Input::<u32>::with_theme(theme)
        .with_prompt("Number of pods")
        .default(form.replicas)
        .validate_with(|input: &u32| validate_replicas(*input))
        .interact_text()?;

    Ok(())
}

async fn select_namespace(
    theme: &dyn Theme,
    form: &mut DeploymentForm,
    default: Option<String>,
) -> Result<()> {
    if form.namespaces.available.is_empty() {
        let create = Confirm::with_theme(theme)
            .with_prompt("No namespaces found. Create one?")
            .default(true)
            .interact()?;
        if create {
            form.request_namespace_creation(&PromptNamespacePicker).await;
        }
        return Ok(());
    }

    let items = form
        .namespaces
        .available
        .iter()
        .map(String::as_str)
        .chain([CREATE_NAMESPACE_ITEM])
        .collect::<Vec<_>>();
    let default_idx = default
        .and_then(|d| form.namespaces.available.iter().position(|ns| ns.eq(&d)))
        .unwrap_or(0);
    let selected_idx = FuzzySelect::with_theme(theme)
        .with_prompt("Select namespace")
        .items(&items)
        .default(default_idx)
        .interact()?;

    if !form.namespaces.select(selected_idx) {
        form.request_namespace_creation(&PromptNamespacePicker).await;
    }
    Ok(())
}

fn prompt_more_options(theme: &dyn Theme, form: &mut DeploymentForm) -> Result<()> {
    let show = Confirm::with_theme(theme)
        .with_prompt("Show more options?")
        .default(form.is_more_options_shown())
        .interact()?;
    if show != form.is_more_options_shown() {
        form.toggle_more_options();
    }
    if !form.is_more_options_shown() {
        return Ok(());
    }

    form.description = Input::<String>::with_theme(theme)
        .with_prompt("Description")
        .allow_empty(true)
        .interact_text()?;
    form.container_command = Input::<String>::with_theme(theme)
        .with_prompt("Run command")
        .allow_empty(true)
        .interact_text()?;
    form.container_command_args = Input::<String>::with_theme(theme)
        .with_prompt("Run command arguments")
        .allow_empty(true)
        .interact_text()?;

    prompt_port_mappings(theme, form)?;

    form.is_external = Confirm::with_theme(theme)
        .with_prompt("Expose service externally?")
        .default(form.is_external)
        .interact()?;

    prompt_labels(theme, form)
}

fn prompt_port_mappings(theme: &dyn Theme, form: &mut DeploymentForm) -> Result<()> {
    loop {
        let port = Input::<String>::with_theme(theme)
            .with_prompt("Port (leave empty to finish)")
            .allow_empty(true)
            .validate_with(|input: &String| validate_port(input))
            .interact_text()?;
        let Some(port) = parse_port(&port) else {
            return Ok(());
        };
        let target_port = Input::<String>::with_theme(theme)
            .with_prompt(format!("Target port for {port}"))
            .allow_empty(true)
            .validate_with(|input: &String| validate_port(input))
            .interact_text()?;
        let protocol = Select::with_theme(theme)
            .with_prompt("Protocol")
            .items(&PROTOCOLS[..])
            .default(0)
            .interact()?;

        if !form.port_mappings.last().is_some_and(PortMapping::is_blank) {
            form.add_port_mapping();
        }
        if let Some(mapping) = form.port_mappings.last_mut() {
            mapping.port = Some(port);
            mapping.target_port = parse_port(&target_port);
            mapping.protocol = PROTOCOLS[protocol].to_owned();
            if mapping.is_partial() {
                warn!("Port {port} has no target port, the mapping will be left out");
            }
        }
    }
}

fn prompt_labels(theme: &dyn Theme, form: &mut DeploymentForm) -> Result<()> {
    for label in form.labels.iter().filter(|l| !l.is_editable()) {
        eprintln!(
            "Label {}={} is set automatically",
            style(label.key()).cyan(),
            label.value(form)
        );
    }
    loop {
        let key = Input::<String>::with_theme(theme)
            .with_prompt("Label key (leave empty to finish)")
            .allow_empty(true)
            .interact_text()?;
        if key.is_empty() {
            return Ok(());
        }
        let value = Input::<String>::with_theme(theme)
            .with_prompt(format!("Value for {key}"))
            .allow_empty(true)
            .interact_text()?;
        form.fill_blank_label(&key, &value);
    }
}

fn confirm_deployment(theme: &dyn Theme, form: &DeploymentForm) -> Result<bool> {
    let spec = form.build_deployment_spec();
    eprintln!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(Confirm::with_theme(theme)
        .with_prompt("Deploy?")
        .default(true)
        .interact()?)
}

async fn run(args: Args) -> Result<()> {
    let theme = dialoguer::theme::ColorfulTheme::default();
    let filename = config_file(&args)?;
    let defaults = DefaultSelections::read(&filename);
    let api_url = resolve_api_url(args.api_url.clone(), &defaults);
    let client = HttpDeploymentClient::new(&api_url)?;

    match context::current() {
        Ok(ctx) => eprintln!("Deploying with context {}", style(ctx).green()),
        Err(e) => warn!("Could not read current context: {e}"),
    }

    let mut form = DeploymentForm::new(load_namespaces());

    let default_image = defaults.as_ref().and_then(|d| d.container_image.clone());
    prompt_app(&theme, &mut form, default_image)?;

    let default_namespace = defaults.as_ref().and_then(|d| d.namespace.clone());
    select_namespace(&theme, &mut form, default_namespace).await?;

    prompt_more_options(&theme, &mut form)?;

    if !confirm_deployment(&theme, &form)? {
        return Err(MainError::Aborted);
    }

    let bar = ProgressBar::new_spinner().with_message(format!("Deploying {}...", form.name));
    bar.enable_steady_tick(Duration::from_millis(100));
    let navigator =
        TerminalNavigator::new(form.namespace().map(String::from)).with_progress(bar.clone());
    let deployed = form.submit(&client, &navigator).await;
    bar.finish_and_clear();
    let deployed = deployed?;

    eprintln!(
        "{} {}",
        style("Deployed").green().bold(),
        style(&deployed.name).bold()
    );

    if let Err(e) = Selection::from_form(&form, &api_url).save(&filename) {
        warn!("Could not save selections: {e}");
    }
    Ok(())
}

fn fail(e: MainError) -> ExitCode {
    eprintln!("{e}");
    ExitCode::FAILURE
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    // Prompts hide the cursor; bring it back if the user bails out mid-prompt
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = Term::stderr().show_cursor();
        eprintln!("\nDeployment cancelled.");
        std::process::exit(130);
    }) {
        return fail(MainError::CtrlC(e));
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}
