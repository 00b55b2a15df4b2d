use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod items;
mod services;

use config::Config;
use items::{
    uri, DefaultAppRegistry, DockElement, ItemFactory, ItemKind, StaticRegistry, XdgMimeRegistry,
};
use services::{create_window_tracker, WindowMatcher};

#[derive(Parser, Debug)]
#[command(name = "rdock")]
#[command(about = "Бэкенд дока: элементы дока и отслеживание запущенных приложений")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "rdock.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция матчера и реестра приложений)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Показать элементы дока в сохранённом порядке
    List,
    /// Создать элемент дока для URI или абсолютного пути
    Add { target: String },
    /// Добавить приложения по умолчанию
    Defaults,
    /// Отслеживать запущенные приложения и окна до Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging)?;

    info!("Запуск rdock v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реестр приложений и матчер окон эмулируются");
    }

    let registry: Box<dyn DefaultAppRegistry> = if args.dry_run {
        Box::new(StaticRegistry::new())
    } else {
        Box::new(XdgMimeRegistry::new())
    };
    let factory = ItemFactory::from_config(&config, registry)?;

    match args.command.unwrap_or(Command::List) {
        Command::List => {
            populate_on_first_run(&config, &factory);
            list_items(&config, &factory);
        }
        Command::Add { target } => match factory.make_item_for_uri(&target) {
            Some(path) => println!("{}", path.display()),
            None => warn!("Элемент для '{}' не создан", target),
        },
        Command::Defaults => {
            for path in factory.make_default_items() {
                println!("{}", path.display());
            }
        }
        Command::Watch => {
            populate_on_first_run(&config, &factory);
            watch(config.clone(), &factory, args.dry_run).await?;
        }
    }

    info!("rdock завершил работу");
    Ok(())
}

fn populate_on_first_run(config: &Config, factory: &ItemFactory) {
    if config.defaults.enabled && factory.is_first_run() {
        info!("Первый запуск: заполняем {:?} приложениями по умолчанию", factory.launchers_dir());
        factory.make_default_items();
    }
}

fn list_items(config: &Config, factory: &ItemFactory) {
    let elements = factory.load_elements(config.items.dock_items.as_deref());

    for element in &elements {
        println!(
            "{:<24} {:<12} {:<28} {}",
            element.file_name(),
            element.kind().to_string(),
            element.display_name(),
            element.launcher()
        );
    }

    println!(
        "dock_items = \"{}\"",
        items::ordering::serialize(elements.as_slice(), |element| element.file_name())
    );
}

/// Пути .desktop файлов приложений дока в порядке дока
fn collect_favorites(elements: &[Box<dyn DockElement>]) -> Vec<String> {
    elements
        .iter()
        .filter(|element| element.kind() == ItemKind::Application)
        .filter_map(|element| uri::to_path(element.launcher()))
        .map(|path| path.to_string_lossy().into_owned())
        .collect()
}

async fn watch(config: Arc<Config>, factory: &ItemFactory, dry_run: bool) -> Result<()> {
    let elements = factory.load_elements(config.items.dock_items.as_deref());
    let favorites = collect_favorites(&elements);

    let tracker = create_window_tracker(config.clone(), dry_run).await?;
    let matcher = WindowMatcher::open(tracker).await?;
    matcher.set_favorites(&favorites).await;

    for favorite in &favorites {
        match matcher.app_for_uri(favorite).await {
            Ok(Some(app)) => info!("Избранное {} запущено: {}", favorite, app),
            Ok(None) => {}
            Err(e) => warn!("Не удалось проверить {}: {}", favorite, e),
        }
    }

    let running = matcher.running_applications().await?;
    info!("Запущено приложений: {}", running.len());

    let mut events = matcher.subscribe();
    info!("Отслеживание приложений запущено");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => info!("{}", event),
                Err(RecvError::Lagged(skipped)) => warn!("Пропущено {} событий матчера", skipped),
                Err(RecvError::Closed) => {
                    warn!("Поток событий матчера закрыт");
                    break;
                }
            },
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
        }
    }

    info!("Завершение работы...");
    matcher.close().await?;
    Ok(())
}

fn init_tracing(level: &str, logging: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},{}", level, logging.filter)))?;

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    Ok(())
}
