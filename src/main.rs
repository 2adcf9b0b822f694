use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gravatar::application::ImageService;
use gravatar::domain::entities::{
    AccessToken, AccountIdentifier, AvatarIdentifier, Email, HashId, ImageDownloadOptions,
};
use gravatar::infrastructure::{CliArgs, ClientConfig, Command, InMemoryImageCache, StorageManager};

fn init_logging(config: &ClientConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<ClientConfig> {
    let mut config = match StorageManager::for_override(args.config.as_deref()) {
        Ok(storage) => storage.load_config()?,
        Err(e) => {
            eprintln!("warning: {e}, using default configuration");
            ClientConfig::default()
        }
    };
    config.merge_with_args(args);
    Ok(config)
}

fn avatar_identifier(identifier: String, hash: bool) -> AvatarIdentifier {
    if hash {
        HashId::new(identifier).into()
    } else {
        Email::new(identifier).into()
    }
}

async fn run(command: Command, config: &ClientConfig) -> Result<()> {
    let service = ImageService::from_config(config, Arc::new(InMemoryImageCache::new()))?;
    let query = config.avatar.query_options();

    match command {
        Command::Url { identifier, hash } => {
            let identifier = avatar_identifier(identifier, hash);
            let url = service.avatar_url(&identifier, query)?;
            println!("{url}");
        }
        Command::Fetch {
            identifier,
            output,
            hash,
            force_refresh,
        } => {
            let options = ImageDownloadOptions::new()
                .with_avatar_query(query)
                .with_force_refresh(force_refresh);
            let result = service
                .fetch_image(avatar_identifier(identifier, hash), &options)
                .await?;

            result
                .image
                .save(&output)
                .wrap_err_with(|| format!("failed to save {}", output.display()))?;
            info!(
                url = %result.source_url,
                width = result.image.width(),
                height = result.image.height(),
                path = %output.display(),
                "Avatar saved"
            );
        }
        Command::Upload { path, email, token } => {
            let token = AccessToken::new(token).ok_or_else(|| eyre!("access token is empty"))?;
            let email = Email::new(email);
            if email.is_empty() {
                warn!("Uploading with an empty account email");
            }
            let account = AccountIdentifier::new(email, token);
            let image = image::open(&path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;

            service.upload_image(&image, &account).await?;
            println!("Uploaded {} for {}", path.display(), account.email());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = gravatar::VERSION, "Starting {}", gravatar::NAME);

    run(args.command, &config).await
}
