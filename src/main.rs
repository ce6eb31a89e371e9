use clap::Parser;
use pif_gen::adapters::http::build_client;
use pif_gen::config::{CheckArgs, Command, GenerateArgs, LocalArgs, ReleaseArgs, RunArgs};
use pif_gen::core::generator::{parse_manifest, PifGenerator};
use pif_gen::core::pif::{build_pif, output_filename};
use pif_gen::core::props::parse_system_prop;
use pif_gen::core::Storage;
use pif_gen::utils::logger;
use pif_gen::utils::validation::validate_required_field;
use pif_gen::{
    CliConfig, GitHubClient, LocalStorage, PifConfig, PifError, PifWorkflow, ReleaseChecker,
    ReleasePublisher, Result,
};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting pif-gen {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = execute(cli).await {
        tracing::error!(
            "pif-gen failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn execute(cli: CliConfig) -> Result<()> {
    let config = cli.resolve()?;
    tracing::debug!("Resolved config: {:?}", config);

    match cli.command {
        Command::Check(args) => check(&config, args).await,
        Command::Generate(args) => generate(&config, args).await,
        Command::Release(args) => release(&config, args).await,
        Command::Run(args) => run(&config, args).await,
        Command::Local(args) => local(&config, args).await,
    }
}

fn github_client(config: &PifConfig) -> Result<GitHubClient> {
    GitHubClient::new(
        &config.github.api_base,
        config.github.token.clone(),
        &config.github.user_agent,
        config.github_timeout(),
    )
}

fn download_client(config: &PifConfig) -> Result<reqwest::Client> {
    build_client(&config.github.user_agent, config.download_timeout())
}

async fn check(config: &PifConfig, args: CheckArgs) -> Result<()> {
    if config.github.token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; using unauthenticated requests");
    }

    let checker = ReleaseChecker::new(
        github_client(config)?,
        LocalStorage::new(&config.output.state_directory),
        config.sources.clone(),
    )
    .with_github_output(args.github_output);

    let report = checker.check().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn generate(config: &PifConfig, args: GenerateArgs) -> Result<()> {
    let assets = args.load_assets()?;

    let generator = PifGenerator::new(
        LocalStorage::new(&config.output.directory),
        download_client(config)?,
        args.repo_type,
    )
    .with_download_timeout(config.download_timeout())
    .with_manifest_name(config.output.manifest.clone());

    let report = generator.generate_all(&assets).await?;

    println!("SUCCESS: {}/{}", report.generated.len(), report.total);
    println!("FAILED:  {}/{}", report.failed.len(), report.total);
    for name in &report.failed {
        println!("  - {}", name);
    }
    Ok(())
}

async fn release(config: &PifConfig, args: ReleaseArgs) -> Result<()> {
    validate_required_field("github.token", &config.github.token)?;
    pif_gen::utils::validation::validate_repo_slug("repo", &args.repo)?;

    let content = match &args.manifest {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let storage = LocalStorage::new(&config.output.directory);
            String::from_utf8_lossy(&storage.read_file(&config.output.manifest).await?).into_owned()
        }
    };
    let files = parse_manifest(&content);

    let publisher = ReleasePublisher::new(
        github_client(config)?,
        LocalStorage::new(&config.output.directory),
    );
    let summary = publisher
        .publish(&args.repo, &args.tag, args.repo_type, &files)
        .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run(config: &PifConfig, args: RunArgs) -> Result<()> {
    if config.publish.repository.is_some() {
        validate_required_field("github.token", &config.github.token)?;
    }

    let workflow = PifWorkflow::new(github_client(config)?, download_client(config)?, config.clone());
    let outcomes = workflow.run(args.github_output).await?;

    if outcomes.is_empty() {
        println!("No new releases");
        return Ok(());
    }

    for outcome in &outcomes {
        let generated = outcome
            .generation
            .as_ref()
            .map(|g| format!("{}/{}", g.generated.len(), g.total))
            .unwrap_or_else(|| "0".to_string());
        match &outcome.error {
            None => println!(
                "✅ {} {}: generated {}",
                outcome.release.repo_type, outcome.release.latest_tag, generated
            ),
            Some(e) => println!(
                "❌ {} {}: {}",
                outcome.release.repo_type, outcome.release.latest_tag, e
            ),
        }
    }

    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    if failed > 0 {
        return Err(PifError::WorkflowFailed {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

async fn local(config: &PifConfig, args: LocalArgs) -> Result<()> {
    let data = tokio::fs::read(&args.path).await?;
    let is_zip = data.starts_with(ZIP_MAGIC);
    // ZIP names keep their extension; output_filename strips ".zip" itself
    let name = if is_zip {
        args.path.file_name()
    } else {
        args.path.file_stem()
    }
    .and_then(|n| n.to_str())
    .unwrap_or("system")
    .to_string();

    let pif = if is_zip {
        PifGenerator::<LocalStorage>::profile_from_zip(&data)?
    } else {
        let props = parse_system_prop(&String::from_utf8_lossy(&data));
        tracing::debug!("Parsed {} properties", props.len());
        build_pif(&props)?
    };
    let json = pif.to_json_pretty()?;

    if args.write {
        let storage = LocalStorage::new(&config.output.directory);
        let filename = output_filename(args.repo_type, &name);
        storage.write_file(&filename, json.as_bytes()).await?;
        println!("{}", storage.resolve(&filename).display());
    } else {
        println!("{}", json);
    }
    Ok(())
}
