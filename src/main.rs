use bematore_checkout::application::checkout::{CheckoutController, CheckoutPorts};
use bematore_checkout::application::completion::{CompletionBridge, HostCapabilities};
use bematore_checkout::application::contact::{ContactLauncher, SUPPORT_SUBJECT};
use bematore_checkout::application::notifier::NotificationPresenter;
use bematore_checkout::application::poller::Visibility;
use bematore_checkout::application::submission::SubmitOutcome;
use bematore_checkout::config::{CheckoutSettings, PageContext};
use bematore_checkout::domain::form::FormData;
use bematore_checkout::domain::method::PaymentMethod;
use bematore_checkout::domain::ports::LinkOpener;
use bematore_checkout::domain::phone::{PhoneNumberInput, PhoneValidation};
use bematore_checkout::domain::status::TransactionStatus;
use bematore_checkout::error::{CheckoutError, Result as CheckoutResult};
use bematore_checkout::infrastructure::http::HttpGateway;
use bematore_checkout::interfaces::console::{ConsoleSurface, NoClipboard, PrintingOpener};
use bematore_checkout::logger::setup_logger;
use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a phone number as the checkout form would
    FormatPhone {
        /// Raw input, e.g. "0712 345 678" or "+254712345678"
        raw: String,
    },
    /// Select a payment method and submit the checkout form
    Submit {
        #[command(flatten)]
        page: PageArgs,

        #[arg(long)]
        method: PaymentMethod,

        /// Phone number for M-Pesa payments
        #[arg(long)]
        phone: Option<String>,

        /// Extra form field as NAME=VALUE (repeatable)
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Poll a pending transaction until it settles
    Poll {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Signal payment completion to the host app
    Complete {
        #[command(flatten)]
        page: PageArgs,

        #[arg(long, value_enum, default_value_t = BridgeKind::DeepLink)]
        bridge: BridgeKind,
    },
    /// Open the support mail link
    Contact {
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BridgeKind {
    DeepLink,
    Close,
}

#[derive(Args)]
struct PageArgs {
    /// JSON file holding the page context; flags below override its values
    #[arg(long)]
    context: Option<PathBuf>,

    #[arg(long)]
    base_url: Option<Url>,

    #[arg(long)]
    transaction_id: Option<String>,

    /// Bearer token for the status API
    #[arg(long, env = "BEMATORE_TOKEN")]
    token: Option<String>,

    #[arg(long)]
    csrf_token: Option<String>,

    /// Form action path
    #[arg(long)]
    action: Option<String>,

    /// Payment status the page was rendered with
    #[arg(long)]
    status: Option<TransactionStatus>,
}

impl PageArgs {
    fn into_context(self) -> CheckoutResult<PageContext> {
        let mut context = match self.context {
            Some(path) => PageContext::from_json_file(path)?,
            None => {
                let base_url = self.base_url.clone().ok_or_else(|| {
                    CheckoutError::Config("--base-url or --context is required".to_string())
                })?;
                let transaction_id = self.transaction_id.clone().ok_or_else(|| {
                    CheckoutError::Config("--transaction-id or --context is required".to_string())
                })?;
                PageContext::new(base_url, transaction_id)
            }
        };

        if let Some(base_url) = self.base_url {
            context.base_url = base_url;
        }
        if let Some(transaction_id) = self.transaction_id {
            context.transaction_id = transaction_id;
        }
        if let Some(token) = self.token {
            context.token = token;
        }
        if let Some(csrf_token) = self.csrf_token {
            context.csrf_token = Some(csrf_token);
        }
        if let Some(action) = self.action {
            context.form_action = action;
        }
        if let Some(status) = self.status {
            context.payment_status = status;
        }
        context.check()?;
        Ok(context)
    }
}

fn parse_field(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))
}

fn controller(context: PageContext, bridge: BridgeKind) -> CheckoutResult<CheckoutController> {
    let console = Arc::new(ConsoleSurface::new());
    let gateway = Arc::new(HttpGateway::new(context.base_url.clone())?);

    let mut host = HostCapabilities::browser(console.clone());
    if matches!(bridge, BridgeKind::DeepLink) {
        let opener: Arc<dyn LinkOpener> = Arc::new(PrintingOpener);
        host.deep_link = Some(opener);
    }

    Ok(CheckoutController::new(
        context,
        CheckoutSettings::default(),
        CheckoutPorts {
            gateway,
            toasts: console.clone(),
            navigator: console.clone(),
            form: console,
        },
        CompletionBridge::resolve(host),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.log_level);

    match cli.command {
        Command::FormatPhone { raw } => {
            let input = PhoneNumberInput::normalize(&raw);
            println!("display: {}", input.display());
            println!("local: {}", input.local());
            println!("international: {}", input.international());
            println!("valid: {}", input.validate() == PhoneValidation::Valid);
        }
        Command::Submit {
            page,
            method,
            phone,
            fields,
        } => {
            let context = page.into_context().into_diagnostic()?;
            let checkout = controller(context, BridgeKind::Close).into_diagnostic()?;

            checkout.on_select(method);
            if let Some(phone) = phone {
                checkout.on_phone_input(&phone);
                checkout.on_phone_blur();
            }

            let form: FormData = fields.into_iter().collect();
            match checkout.on_submit(form).await {
                SubmitOutcome::Redirected(url) => println!("{url}"),
                SubmitOutcome::Responded(body) => println!("{}", body.text),
                SubmitOutcome::Rejected(error) => return Err(miette!("{}", error.message())),
                SubmitOutcome::NetworkError(e) => return Err(miette!("{}", e)),
                SubmitOutcome::Ignored => {}
            }
        }
        Command::Poll { page } => {
            let context = page.into_context().into_diagnostic()?;
            let checkout = controller(context, BridgeKind::Close).into_diagnostic()?;

            let (_visibility, rx) = watch::channel(Visibility::Visible);
            let Some(handle) = checkout.start_polling(rx) else {
                println!("{}", checkout.context().payment_status);
                return Ok(());
            };

            tokio::select! {
                status = handle.finished() => {
                    if let Some(status) = status {
                        println!("{status}");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("Polling interrupted");
                }
            }
        }
        Command::Complete { page, bridge } => {
            let context = page.into_context().into_diagnostic()?;
            let status = context.payment_status;
            controller(context, bridge)
                .into_diagnostic()?
                .on_complete(status);
        }
        Command::Contact { email } => {
            let notifier = NotificationPresenter::new(
                Arc::new(ConsoleSurface::new()),
                CheckoutSettings::default().toast_lifetime,
            );
            let mut launcher =
                ContactLauncher::new(Arc::new(PrintingOpener), Arc::new(NoClipboard), notifier);
            if let Some(email) = email {
                launcher = launcher.with_address(email, SUPPORT_SUBJECT);
            }
            launcher.launch();
        }
    }

    Ok(())
}
