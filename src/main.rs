//! CLI authplug
//!
//! Административные команды: генерация PBKDF2-записей, проверка учётных
//! данных и ACL по конфигурации плагина, наполнение redb-хранилища.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use authplug::{
    auth::backends::{AclEntry, RedbBackend},
    hash_password, init_logging, Access, AuthOptions, AuthPlugin, Digest, HashParams, LogFormat,
    LoggingConfig, PluginStatus,
};
use clap::{Parser, Subcommand};
use tracing::debug;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Основная структура CLI аргументов.
#[derive(Parser)]
#[command(name = "authplug")]
#[command(version = env!("CARGO_PKG_VERSION"), long_version = LONG_VERSION)]
#[command(about = "Authentication and ACL tooling for MQTT brokers", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Включить подробный вывод (debug)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Только ошибки
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Формат логов в stderr
    #[arg(long, global = true, default_value = "compact", env = "AUTHPLUG_LOG_FORMAT")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Сгенерировать PBKDF2-запись для пароля
    Hash {
        password: String,
        #[arg(long, default_value_t = 901)]
        iterations: u32,
        #[arg(long, default_value = "sha256", value_parser = parse_digest)]
        digest: Digest,
        #[arg(long, default_value_t = 12)]
        salt_len: usize,
        #[arg(long, default_value_t = 24)]
        key_len: usize,
    },
    /// Проверить логин и пароль через цепочку бэкендов
    CheckUser {
        #[arg(short, long, env = "AUTHPLUG_CONFIG")]
        config: PathBuf,
        username: String,
        password: String,
    },
    /// Проверить доступ к топику
    CheckAcl {
        #[arg(short, long, env = "AUTHPLUG_CONFIG")]
        config: PathBuf,
        #[arg(long, default_value = "authplug-cli")]
        client_id: String,
        #[arg(short, long, default_value = "read")]
        access: Access,
        username: String,
        topic: String,
    },
    /// Добавить или обновить пользователя в redb-хранилище
    ///
    /// redb держит эксклюзивную блокировку файла: команда завершится ошибкой,
    /// пока файл открыт брокером. Остановите брокер или работайте с копией.
    RedbAddUser {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        superuser: bool,
        #[arg(long, default_value_t = 901)]
        iterations: u32,
        username: String,
        password: String,
    },
    /// Добавить ACL-правило в redb-хранилище
    ///
    /// redb держит эксклюзивную блокировку файла: команда завершится ошибкой,
    /// пока файл открыт брокером. Остановите брокер или работайте с копией.
    RedbAddAcl {
        #[arg(long)]
        db: PathBuf,
        /// Маска доступа: 1 read, 2 write, 4 subscribe, можно складывать
        #[arg(long)]
        access: u8,
        username: String,
        pattern: String,
    },
}

fn parse_digest(s: &str) -> Result<Digest, String> {
    s.parse::<Digest>().map_err(|e| e.to_string())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let mut log_config = LoggingConfig {
        level: level.to_string(),
        ..Default::default()
    };
    log_config.console.format = cli.log_format;
    let logging = init_logging(log_config).context("initializing logging")?;

    let code = run(cli.command)?;
    logging.shutdown();
    Ok(code)
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Hash {
            password,
            iterations,
            digest,
            salt_len,
            key_len,
        } => {
            let params = HashParams {
                digest,
                iterations,
                salt_len,
                key_len,
            };
            println!("{}", hash_password(&password, &params)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckUser {
            config,
            username,
            password,
        } => {
            let plugin = load_plugin(&config)?;
            let status = plugin.unpwd_check(&username, &password);
            plugin.cleanup();
            Ok(report(status))
        }
        Commands::CheckAcl {
            config,
            client_id,
            access,
            username,
            topic,
        } => {
            let plugin = load_plugin(&config)?;
            let status = plugin.acl_check(&client_id, &username, &topic, access);
            plugin.cleanup();
            Ok(report(status))
        }
        Commands::RedbAddUser {
            db,
            superuser,
            iterations,
            username,
            password,
        } => {
            let params = HashParams {
                iterations,
                ..HashParams::default()
            };
            let record = hash_password(&password, &params)?;
            let store = RedbBackend::create(&db).with_context(|| {
                format!("opening {} (is it held open by a running broker?)", db.display())
            })?;
            store.put_user(&username, &record)?;
            store.set_superuser(&username, superuser)?;
            debug!(username, superuser, "user stored");
            println!("stored user `{username}`");
            Ok(ExitCode::SUCCESS)
        }
        Commands::RedbAddAcl {
            db,
            access,
            username,
            pattern,
        } => {
            anyhow::ensure!(access != 0 && access <= 7, "access mask must be in 1..=7");
            let store = RedbBackend::create(&db).with_context(|| {
                format!("opening {} (is it held open by a running broker?)", db.display())
            })?;
            store.add_acl(
                &username,
                &AclEntry {
                    mask: access,
                    filter: pattern.clone(),
                },
            )?;
            println!("stored acl `{access} {pattern}` for `{username}`");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_plugin(config: &Path) -> Result<AuthPlugin> {
    let opts = AuthOptions::load(config)
        .with_context(|| format!("loading options from {}", config.display()))?;
    Ok(AuthPlugin::init(opts)?)
}

fn report(status: PluginStatus) -> ExitCode {
    println!("{status} ({})", status.code());
    if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
