use anyhow::{anyhow, Context};
use clap::Parser;
use label_validator::{catalog, cli, config, error, review, scanner, store, working_set};
use catalog::Catalog;
use cli::{Cli, Commands};
use config::Config;
use store::{ResultStore, StoreState};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use working_set::WorkingSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Review { validator_index, validator, count } => {
            println!("🍱 label-validator - レビュー\n");

            let mut roster = config.roster()?;
            if let Some(index) = validator_index {
                roster.select(index)?;
            }
            if let Some(name) = validator {
                if roster.select_by_name(&name).is_none() {
                    return Err(anyhow!(
                        "検証者が見つかりません: {} (登録: {})",
                        name,
                        roster.names().join(", ")
                    ));
                }
            }
            let validator = roster.current().to_string();

            // 1. カタログ
            let dictionary = config.load_categories()?;
            let catalog = Catalog::scan(&config.image_dir, dictionary)?;
            if catalog.is_empty() {
                return Err(error::ValidatorError::NoImagesFound(
                    config.image_dir.display().to_string(),
                )
                .into());
            }
            println!("✔ {}枚の画像を検出", catalog.len());

            // 2. 判定結果ストア
            let store = ResultStore::open(config.store_paths())
                .with_context(|| format!("判定結果を開けません: {}", config.data_dir.display()))?;
            if store.state() == StoreState::Recovered {
                println!("⚠ 前回は正常終了していません。自動保存から復元しました");
            }
            store.start_heartbeat(config.heartbeat_interval())?;
            println!("✔ {}: 判定済み {}枚\n", validator, store.judged_count(&validator));

            // 3. 対話（入力待ちはブロッキングスレッドで行い、Ctrl-Cでも保存して終わる）
            let closer = store.closer();
            let session = tokio::task::spawn_blocking(move || {
                let summary = review::run_review(&catalog, &store, &validator, count);
                (store, summary)
            });

            tokio::select! {
                joined = session => {
                    let (store, summary) = joined.context("レビューが異常終了しました")?;
                    store.close()?;
                    let summary = summary?;
                    println!(
                        "\n✅ 判定 {}枚 / スキップ {}枚{}",
                        summary.judged,
                        summary.skipped,
                        if summary.missing > 0 {
                            format!(" / 未判定の画像不足 {}枚", summary.missing)
                        } else {
                            String::new()
                        }
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("\n中断されました。保存して終了します...");
                    // 入力待ちのスレッドは終わらないので、失敗時もここで終了する
                    let saved = closer.close();
                    if let Err(e) = &saved {
                        error!(error = %e, "中断時の保存に失敗しました");
                        eprintln!("❌ 保存に失敗しました: {}", e);
                    }
                    std::process::exit(review::interrupt_exit_code(&saved));
                }
            }
        }

        Commands::List => {
            let dictionary = config.load_categories()?;
            let catalog = Catalog::scan(&config.image_dir, dictionary)?;
            println!("画像: {}枚 ({})", catalog.len(), config.image_dir.display());

            for record in catalog.images() {
                match catalog.labels_of(record) {
                    Ok(labels) => println!("  {}  {}", record.image_id, labels.join(", ")),
                    Err(e) => println!("  {}  ⚠ {}", record.image_id, e),
                }
            }
        }

        Commands::Status => {
            // 実行中のレビューに影響しないよう、ファイルは読むだけ
            let paths = config.store_paths();
            let judgments = ResultStore::read_snapshot(&paths)
                .with_context(|| format!("判定結果を読めません: {}", paths.primary.display()))?;

            println!("判定状況:");
            println!("  結果ファイル: {}", paths.primary.display());
            println!("  判定済み画像: {}枚", judgments.len());
            for name in &config.validators {
                let count = judgments.values().filter(|v| v.contains_key(name)).count();
                println!("  {}: {}枚", name, count);
            }
            if paths.has_unclean_shutdown() {
                println!("⚠ 自動保存が残っています（レビュー中、または前回の異常終了）。上の件数は自動保存の内容です");
            }
        }

        Commands::ExportSet { output, images } => {
            let mut set = WorkingSet::new(Vec::new());
            for arg in &images {
                let (image, remark) = cli::parse_staged_arg(arg);
                set.push(image, remark);
            }

            match scanner::list_images(&config.image_dir) {
                Ok(known) => {
                    for image in set.unknown_images(&known) {
                        println!("⚠ カタログにない画像: {}", image);
                    }
                }
                Err(e) => warn!(error = %e, "画像フォルダを確認できないため、カタログとの照合を省略します"),
            }
            set.save(&output)?;
            println!("✔ 作業セットを保存: {} ({}件)", output.display(), set.entries.len());
        }

        Commands::ImportSet { input } => {
            let set = WorkingSet::load(&input)?;
            println!("作業セット: {} ({}件)", input.display(), set.entries.len());
            if let Some(saved_at) = set.saved_at {
                println!("  保存日時: {}", saved_at.format("%Y-%m-%d %H:%M:%S"));
            }
            for (idx, entry) in set.entries.iter().enumerate() {
                println!(
                    "  [{}] {} - {}",
                    idx + 1,
                    entry.image,
                    entry.remark.as_deref().unwrap_or(label_validator_common::NO_REMARK)
                );
            }
        }

        Commands::Config { set_image_dir, set_data_dir, set_categories, show } => {
            let mut config = config;
            let changed = set_image_dir.is_some() || set_data_dir.is_some() || set_categories.is_some();

            if let Some(dir) = set_image_dir {
                config.image_dir = dir;
            }
            if let Some(dir) = set_data_dir {
                config.data_dir = dir;
            }
            if let Some(path) = set_categories {
                config.categories = Some(path);
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  画像フォルダ: {}", config.image_dir.display());
                println!("  結果フォルダ: {}", config.data_dir.display());
                println!("  カテゴリ辞書: {}", config.categories_path().display());
                println!("  自動保存間隔: {}秒", config.heartbeat_interval_secs);
                println!("  検証者: {}", config.validators.join(", "));
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}
