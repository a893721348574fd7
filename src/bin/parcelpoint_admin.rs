use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use parcelpoint_admin::{
    config::{self, AdminConfig},
    models::{NewPackage, Package, PackageUpdate, UserId},
    uploads::UploadFile,
    PackageAdminView, WarehouseClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(&config.log_level, config.log_json);
    let context = CliContext::initialize(&config)?;

    match cli.command {
        Commands::Packages(command) => handle_packages_command(context, command, cli.json).await?,
        Commands::ServiceRequests(command) => {
            handle_service_requests_command(context, command, cli.json).await?
        }
        Commands::Statuses => handle_statuses_command(context, cli.json).await?,
    }

    Ok(())
}

struct CliContext {
    client: WarehouseClient,
}

impl CliContext {
    fn initialize(config: &AdminConfig) -> Result<Self> {
        let client =
            WarehouseClient::from_config(config).context("failed to build API client")?;
        Ok(Self { client })
    }

    fn view(&self) -> PackageAdminView {
        PackageAdminView::new(self.client.clone())
    }
}

#[derive(Parser)]
#[command(
    name = "parcelpoint-admin",
    about = "ParcelPoint warehouse admin console",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Packages(PackagesCommands),
    #[command(subcommand, name = "service-requests")]
    ServiceRequests(ServiceRequestsCommands),
    /// Show the package and service-request status vocabularies
    Statuses,
}

#[derive(Subcommand)]
enum PackagesCommands {
    List(ListPackagesArgs),
    Show(ShowPackageArgs),
    Create(CreatePackageArgs),
    Update(UpdatePackageArgs),
    UploadImage(UploadImageArgs),
}

#[derive(Subcommand)]
enum ServiceRequestsCommands {
    Start(ServiceRequestArgs),
    Complete(ServiceRequestArgs),
}

#[derive(Args)]
struct ListPackagesArgs {
    #[arg(long, help = "Mailbox owner identifier")]
    user: UserId,
}

#[derive(Args)]
struct ShowPackageArgs {
    #[arg(long, help = "Mailbox owner identifier")]
    user: UserId,
    #[arg(long, help = "Package identifier")]
    id: i64,
}

#[derive(Args)]
struct CreatePackageArgs {
    #[arg(long, help = "Mailbox owner identifier")]
    user: UserId,
    #[arg(long, help = "Receiving warehouse identifier")]
    warehouse: i64,
    #[arg(long, help = "User suite (mailbox address identifier)")]
    suite: String,
    #[arg(long, help = "Recipient full name")]
    full_name: String,
    #[arg(long, help = "Initial status (defaults to in_warehouse)")]
    status: Option<String>,
    #[arg(long, value_parser = parse_decimal, help = "Weight in kilograms")]
    weight: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Length in centimeters")]
    length: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Width in centimeters")]
    width: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Height in centimeters")]
    height: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Declared value")]
    declared_value: Option<Decimal>,
    #[arg(long, help = "Warehouse shelf/bin location")]
    location: Option<String>,
    #[arg(long, help = "Sender name")]
    sender: Option<String>,
    #[arg(long, help = "Inbound tracking number")]
    tracking: Option<String>,
    #[arg(long, help = "Path to a package photo to attach")]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct UpdatePackageArgs {
    #[arg(long, help = "Package identifier")]
    id: i64,
    #[arg(long, help = "New status")]
    status: Option<String>,
    #[arg(long, help = "New shelf/bin location")]
    location: Option<String>,
    #[arg(long, value_parser = parse_decimal, help = "Weight in kilograms")]
    weight: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Length in centimeters")]
    length: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Width in centimeters")]
    width: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Height in centimeters")]
    height: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal, help = "Declared value")]
    declared_value: Option<Decimal>,
    #[arg(long, help = "Sender name")]
    sender: Option<String>,
    #[arg(long, help = "Inbound tracking number")]
    tracking: Option<String>,
    #[arg(long, help = "Path to a package photo to attach with the update")]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct UploadImageArgs {
    #[arg(long, help = "Package identifier")]
    id: i64,
    #[arg(long, help = "Path to the image file")]
    file: PathBuf,
}

#[derive(Args)]
struct ServiceRequestArgs {
    #[arg(long, help = "Mailbox owner identifier (used to load the package list)")]
    user: UserId,
    #[arg(long, help = "Service request identifier")]
    id: i64,
}

async fn handle_packages_command(
    context: CliContext,
    command: PackagesCommands,
    json: bool,
) -> Result<()> {
    match command {
        PackagesCommands::List(args) => {
            let mut view = context.view();
            view.load_packages(Some(args.user)).await;
            if let Some(error) = view.error() {
                return Err(anyhow!("{}", error));
            }
            let packages = view.packages();
            if json {
                print_json(&packages)?;
            } else if packages.is_empty() {
                println!("No packages for user {}", args.user);
            } else {
                for package in &packages {
                    print_package_row(package);
                }
            }
        }
        PackagesCommands::Show(args) => {
            let mut view = context.view();
            view.load_packages(Some(args.user)).await;
            if !view.select_package(args.id) {
                return Err(anyhow!("package {} not found for user {}", args.id, args.user));
            }
            let package = view
                .selected_package()
                .ok_or_else(|| anyhow!("package {} not found for user {}", args.id, args.user))?;
            if json {
                print_json(&package)?;
            } else {
                print_package_detail(&package);
            }
        }
        PackagesCommands::Create(args) => {
            let mut draft = NewPackage::new(args.user, args.warehouse, args.suite, args.full_name);
            if let Some(status) = args.status {
                draft.status = status;
            }
            draft.weight = args.weight;
            draft.length = args.length;
            draft.width = args.width;
            draft.height = args.height;
            draft.declared_value = args.declared_value;
            draft.location = args.location;
            draft.sender_name = args.sender;
            draft.tracking_number = args.tracking;

            let image = args
                .image
                .as_deref()
                .map(UploadFile::from_path)
                .transpose()
                .context("image rejected")?;

            let mut view = context.view();
            let package = view
                .create_package(&draft, image.as_ref())
                .await
                .context("failed to create package")?;
            if json {
                print_json(&package)?;
            } else {
                println!("Created {}", package);
            }
        }
        PackagesCommands::Update(args) => {
            let update = PackageUpdate {
                status: args.status,
                location: args.location,
                weight: args.weight,
                length: args.length,
                width: args.width,
                height: args.height,
                declared_value: args.declared_value,
                sender_name: args.sender,
                tracking_number: args.tracking,
            };
            if update.is_empty() && args.image.is_none() {
                return Err(anyhow!("nothing to update: pass at least one field"));
            }

            let image = args
                .image
                .as_deref()
                .map(UploadFile::from_path)
                .transpose()
                .context("image rejected")?;

            let mut view = context.view();
            let package = view
                .update_package_with_image(args.id, &update, image.as_ref())
                .await
                .context("failed to update package")?;
            if json {
                print_json(&package)?;
            } else {
                println!("Updated {}", package);
            }
        }
        PackagesCommands::UploadImage(args) => {
            let file = UploadFile::from_path(&args.file).context("image rejected")?;
            let mut view = context.view();
            let package = view
                .upload_image(args.id, &file)
                .await
                .context("failed to upload image")?;
            if json {
                print_json(&package)?;
            } else {
                println!("Uploaded image to {} ({} images)", package, package.images.len());
            }
        }
    }

    Ok(())
}

async fn handle_service_requests_command(
    context: CliContext,
    command: ServiceRequestsCommands,
    json: bool,
) -> Result<()> {
    let (args, start) = match command {
        ServiceRequestsCommands::Start(args) => (args, true),
        ServiceRequestsCommands::Complete(args) => (args, false),
    };

    let mut view = context.view();
    view.load_packages(Some(args.user)).await;
    if let Some(error) = view.error() {
        return Err(anyhow!("{}", error));
    }

    if start {
        view.start_processing(args.id)
            .await
            .context("failed to start processing")?;
    } else {
        view.mark_complete(args.id)
            .await
            .context("failed to mark complete")?;
    }

    let store = view.store();
    let package_id = store
        .package_of_request(args.id)
        .ok_or_else(|| anyhow!("service request {} not found after update", args.id))?;
    let package = store
        .get(package_id)
        .ok_or_else(|| anyhow!("package {} disappeared from the store", package_id))?;
    let request = package
        .service_request(args.id)
        .ok_or_else(|| anyhow!("service request {} not found after update", args.id))?;

    if json {
        print_json(request)?;
    } else {
        println!(
            "Service request {} on package #{} is now {}",
            request.id, package.id, request.status
        );
    }

    Ok(())
}

async fn handle_statuses_command(context: CliContext, json: bool) -> Result<()> {
    let mut view = context.view();
    view.load_status_vocabularies().await;

    let packages = view.package_statuses();
    let requests = view.service_request_statuses();

    if json {
        print_json(&serde_json::json!({
            "package_statuses": packages.options,
            "service_request_statuses": requests.options,
        }))?;
        return Ok(());
    }

    println!(
        "Package statuses{}:",
        fallback_marker(packages.from_fallback)
    );
    for option in &packages.options {
        println!("  {:<20} {}", option.value, option.label);
    }
    println!(
        "Service request statuses{}:",
        fallback_marker(requests.from_fallback)
    );
    for option in &requests.options {
        println!("  {:<20} {}", option.value, option.label);
    }

    Ok(())
}

fn fallback_marker(from_fallback: bool) -> &'static str {
    if from_fallback {
        " (fallback list, backend unreachable)"
    } else {
        ""
    }
}

fn print_package_row(package: &Package) {
    println!(
        "#{:<6} {:<18} {:<12} {}",
        package.id,
        package.status,
        package.location.as_deref().unwrap_or("-"),
        package.full_name.as_deref().unwrap_or("-"),
    );
}

fn print_package_detail(package: &Package) {
    println!("Package #{}", package.id);
    println!("  status:   {}", package.status);
    println!("  suite:    {}", package.user_suite.as_deref().unwrap_or("-"));
    println!("  name:     {}", package.full_name.as_deref().unwrap_or("-"));
    println!("  location: {}", package.location.as_deref().unwrap_or("-"));
    println!(
        "  sender:   {}",
        package.sender_name.as_deref().unwrap_or("-")
    );
    println!("  images:   {}", package.images.len());
    if package.service_requests.is_empty() {
        println!("  service requests: none");
    } else {
        println!("  service requests:");
        for request in &package.service_requests {
            println!(
                "    [{}] {} - {}",
                request.id, request.service.name, request.status
            );
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    raw.parse::<Decimal>()
        .map_err(|e| format!("invalid decimal '{}': {}", raw, e))
}
