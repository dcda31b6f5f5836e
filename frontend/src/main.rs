//! Comicmaker studio command-line client.
//!
//! A terminal adapter over the library's page controllers: every command
//! drives a controller operation, then prints the resulting view and the
//! queued notifications.

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use comicmaker_frontend::{
    api::ApiClient,
    config::{Config, ConfigOverrides},
    editor::{EditorModal, EntityForm, StyleForm, AUX_IMAGES, MAIN_IMAGE},
    materials::{ListView, MaterialsPage},
    media_capture::{MediaCapture, PathPicker},
    notify::{ConfirmTone, Dialogs, FixedAnswer, Notification, NotificationLevel},
    router::Route,
    tasks::TaskPoller,
    FormPayload, ResponseEnvelope, StagedFile,
};
use comicmaker_types::{EntityId, HistoryQuery, MaterialKind, DEFAULT_HISTORY_LIMIT};
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

/// Comicmaker - comic and video studio client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API root of the studio backend
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true, env = "COMICMAKER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Response envelope used by the backend (auto, bare, wrapped)
    #[arg(long, global = true, value_parser = parse_envelope)]
    envelope: Option<ResponseEnvelope>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage materials (characters, scenes, props, others)
    #[command(subcommand)]
    Materials(MaterialsCommand),
    /// Manage visual styles
    #[command(subcommand)]
    Styles(StylesCommand),
    /// Run generation tools and inspect their tasks
    #[command(subcommand)]
    Tool(ToolCommand),
    /// Browse the tool history
    #[command(subcommand)]
    History(HistoryCommand),
    /// Resolve a page path
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct CategoryArg {
    /// Material category
    #[arg(long, short, default_value = "characters")]
    category: MaterialKind,
}

#[derive(Args, Debug)]
struct MaterialFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Main image file
    #[arg(long)]
    main: Option<PathBuf>,
    /// Auxiliary image files (up to two)
    #[arg(long, num_args = 1..=2)]
    aux: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum MaterialsCommand {
    /// List the materials of a category
    List {
        #[command(flatten)]
        category: CategoryArg,
    },
    /// Show one material
    Show {
        id: String,
        #[command(flatten)]
        category: CategoryArg,
    },
    /// Create a material
    Create {
        #[command(flatten)]
        category: CategoryArg,
        #[command(flatten)]
        fields: MaterialFields,
    },
    /// Update a material; omitted fields keep their stored value
    Update {
        id: String,
        #[command(flatten)]
        category: CategoryArg,
        #[command(flatten)]
        fields: MaterialFields,
    },
    /// Delete a material
    Delete {
        id: String,
        #[command(flatten)]
        category: CategoryArg,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum StylesCommand {
    /// List all styles
    List,
    /// Create a style
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Reference image file
        #[arg(long)]
        image: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ToolCommand {
    /// Start a tool task and wait for its result
    Run {
        /// Tool type (e.g. image, video, audio, script)
        tool: String,
        /// Text parameter as key=value
        #[arg(long = "param", short, value_parser = parse_key_value)]
        params: Vec<(String, String)>,
        /// File parameter as field=path
        #[arg(long = "file", short, value_parser = parse_key_path)]
        files: Vec<(String, PathBuf)>,
        /// Print the task id and return without waiting
        #[arg(long)]
        no_wait: bool,
    },
    /// Show the status of a task
    Status { task_id: String },
    /// Fetch the result of a finished task
    Result { task_id: String },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List past tool runs
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
        #[arg(long)]
        tool_type: Option<String>,
    },
    /// Show one history record
    Show { id: String },
}

fn parse_envelope(s: &str) -> Result<ResponseEnvelope, String> {
    match s.to_ascii_lowercase().as_str() {
        "auto" => Ok(ResponseEnvelope::Auto),
        "bare" => Ok(ResponseEnvelope::Bare),
        "wrapped" => Ok(ResponseEnvelope::Wrapped),
        other => Err(format!("unknown envelope '{}'", other)),
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn parse_key_path(s: &str) -> Result<(String, PathBuf), String> {
    parse_key_value(s).map(|(k, v)| (k, PathBuf::from(v)))
}

/// Confirmation prompts on the terminal.
struct TerminalDialogs;

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn confirm(&self, message: &str, title: &str, tone: ConfirmTone) -> bool {
        let marker = match tone {
            ConfirmTone::Danger => "!",
            ConfirmTone::Normal => "?",
        };
        let prompt = format!("[{}] {}: {} [y/N] ", marker, title, message);
        let answer = tokio::task::spawn_blocking(move || {
            print!("{}", prompt);
            std::io::stdout().flush().ok();
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(Err(e)) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
            Err(e) => {
                tracing::warn!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_figment(&ConfigOverrides {
        base_url: cli.api_url.clone(),
        auth_token: cli.token.clone(),
        timeout_secs: cli.timeout,
        envelope: cli.envelope,
        log_level: cli.log_level.clone(),
    })
    .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let default_level = config.logging.log_level.as_deref().unwrap_or("info");
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Using API at {}", config.api.base_url);
    let api = ApiClient::from_config(&config.api)?;

    match cli.command {
        Command::Materials(command) => run_materials(api, command).await,
        Command::Styles(command) => run_styles(api, command).await,
        Command::Tool(command) => run_tool(api, &config, command).await,
        Command::History(command) => run_history(api, command).await,
        Command::Route { path } => {
            let route: Route = path.parse()?;
            println!("{} -> {}", route.name(), route.path());
            Ok(())
        }
    }
}

async fn run_materials(api: ApiClient, command: MaterialsCommand) -> anyhow::Result<()> {
    match command {
        MaterialsCommand::List { category } => {
            let mut page = MaterialsPage::new(api).with_category(category.category);
            page.load().await;
            println!("{}", page.section_title());
            print_list(page.view());
            flush_notifications(&mut page)
        }
        MaterialsCommand::Show { id, category } => {
            let material = api
                .get_material(category.category, &EntityId::from(id))
                .await?;
            println!("{}", serde_json::to_string_pretty(&material)?);
            Ok(())
        }
        MaterialsCommand::Create { category, fields } => {
            let mut page = MaterialsPage::new(api).with_category(category.category);
            page.open_create();
            fill_material_form(&mut page, fields).await?;
            page.submit().await;
            print_list(page.view());
            flush_notifications(&mut page)
        }
        MaterialsCommand::Update {
            id,
            category,
            fields,
        } => {
            let mut page = MaterialsPage::new(api).with_category(category.category);
            if page.edit(&EntityId::from(id)).await {
                fill_material_form(&mut page, fields).await?;
                page.submit().await;
            }
            flush_notifications(&mut page)
        }
        MaterialsCommand::Delete { id, category, yes } => {
            let mut page = MaterialsPage::new(api).with_category(category.category);
            let id = EntityId::from(id);
            if yes {
                page.delete(&id, &FixedAnswer(true)).await;
            } else {
                page.delete(&id, &TerminalDialogs).await;
            }
            flush_notifications(&mut page)
        }
    }
}

/// Copy command-line fields into the open material editor.
async fn fill_material_form(page: &mut MaterialsPage, fields: MaterialFields) -> anyhow::Result<()> {
    let form = page.editor_mut().form_mut();
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }

    let mut slots: Vec<(&str, PathBuf)> = Vec::new();
    if let Some(main) = fields.main {
        slots.push((MAIN_IMAGE, main));
    }
    slots.extend(AUX_IMAGES.iter().copied().zip(fields.aux));

    for (field, path) in slots {
        if let Some(capture) = form.capture_mut(field) {
            stage_path(capture, path).await?;
        }
    }
    form.decode_previews().await;
    Ok(())
}

async fn stage_path(capture: &mut MediaCapture, path: PathBuf) -> anyhow::Result<()> {
    let picker = PathPicker::new([path.clone()]);
    let selection = capture
        .select_via(&picker)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    for (name, reason) in selection.rejected {
        eprintln!("Skipping {}: {}", name, reason);
    }
    Ok(())
}

async fn run_styles(api: ApiClient, command: StylesCommand) -> anyhow::Result<()> {
    match command {
        StylesCommand::List => {
            for style in api.list_styles().await? {
                println!(
                    "{}\t{}\t{}",
                    style.id,
                    style.name,
                    style.description.unwrap_or_default()
                );
            }
            Ok(())
        }
        StylesCommand::Create {
            name,
            description,
            image,
        } => {
            let mut modal = EditorModal::<StyleForm>::default();
            modal.open(None, &|path: &str| path.to_string());
            let form = modal.form_mut();
            form.name = name.clone();
            form.description = description.unwrap_or_default();
            stage_path(form.image_mut(), image).await?;

            let request = modal.begin_submit()?;
            let result = api.create_style(request.payload).await;
            modal.finish_submit(request.session, result.is_ok());
            result?;
            println!("Created {} '{}'", StyleForm::LABEL, name);
            Ok(())
        }
    }
}

async fn run_tool(api: ApiClient, config: &Config, command: ToolCommand) -> anyhow::Result<()> {
    let poller = TaskPoller::new(api);
    match command {
        ToolCommand::Run {
            tool,
            params,
            files,
            no_wait,
        } => {
            let mut payload = FormPayload::new();
            for (key, value) in params {
                payload.push_text(key, value);
            }
            for (field, path) in files {
                let file = StagedFile::from_path(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                payload.push_file(field, file);
            }

            if no_wait {
                let id = poller.create_task(&tool, payload).await?;
                println!("{}", id);
                return Ok(());
            }

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let policy = config.polling.policy();
            let result = poller.run(&tool, payload, &policy, &cancel).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        ToolCommand::Status { task_id } => {
            let report = poller.status_report(&EntityId::from(task_id)).await?;
            println!("{}", report.status);
            if let Some(progress) = report.progress {
                println!("progress: {}", progress);
            }
            if let Some(message) = report.error.or(report.message) {
                println!("{}", message);
            }
            Ok(())
        }
        ToolCommand::Result { task_id } => {
            let id = EntityId::from(task_id);
            poller.poll_status(&id).await?;
            let result = poller.get_result(&id).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

async fn run_history(api: ApiClient, command: HistoryCommand) -> anyhow::Result<()> {
    match command {
        HistoryCommand::List {
            page,
            limit,
            tool_type,
        } => {
            let query = HistoryQuery {
                page,
                limit,
                tool_type,
            };
            let history = api.list_history(&query).await?;
            if history.records.is_empty() {
                println!("No history");
            }
            for record in history.records {
                let status = record
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}\t{}\t{}\t{}",
                    record.id,
                    record.tool_type.unwrap_or_default(),
                    status,
                    record.created_at.unwrap_or_default()
                );
            }
            Ok(())
        }
        HistoryCommand::Show { id } => {
            let record = api.history_detail(&EntityId::from(id)).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
    }
}

fn print_list(view: &ListView) {
    match view {
        ListView::Empty(message) => println!("{}", message),
        ListView::Cards(cards) => {
            for card in cards {
                println!(
                    "{}\t{}\t{}\t{}",
                    card.id,
                    card.title,
                    card.description,
                    card.image_url.as_deref().unwrap_or("-")
                );
            }
        }
    }
}

/// Print queued notifications; fail when any of them is an error.
fn flush_notifications(page: &mut MaterialsPage) -> anyhow::Result<()> {
    let notifications: Vec<Notification> = page.take_notifications();
    let mut failed = false;
    for notification in &notifications {
        if notification.level == NotificationLevel::Error {
            failed = true;
            eprintln!("{}", notification);
        } else {
            println!("{}", notification);
        }
    }
    if failed {
        bail!("operation failed");
    }
    Ok(())
}
