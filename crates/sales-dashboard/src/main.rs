mod bootstrap;

use anyhow::Result;
use dashboard_core::settings::Settings;
use dashboard_data::report::{analyze_file, ReportOptions};
use dashboard_runtime::orchestrator::ReloadOrchestrator;
use dashboard_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::ensure_directories()?;
    let log_file = settings.resolved_log_file();
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("sales-dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "File: {}, Output: {}, View: {}, Theme: {}",
        settings.file.display(),
        settings.output,
        settings.view,
        settings.theme
    );

    let options = ReportOptions::from_settings(&settings);

    if settings.is_json_output() {
        let report = analyze_file(&settings.file, settings.sheet.as_deref(), &options)?;
        println!("{}", report.to_json()?);
        return Ok(());
    }

    let orchestrator = ReloadOrchestrator::new(
        settings.file.clone(),
        settings.sheet.clone(),
        options,
        u64::from(settings.refresh_rate),
        settings.watch,
    );
    let (rx, handle) = orchestrator.start();

    let app = App::new(&settings.theme, &settings.view);

    // The TUI exits on 'q' / Ctrl+C itself; the signal branch covers
    // interrupts delivered outside raw mode.
    tokio::select! {
        result = app.run(rx, &handle) => {
            handle.abort();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; stopping reload task");
            handle.abort();
        }
    }

    Ok(())
}
