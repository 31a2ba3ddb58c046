//! OS signal handling for the runner.

use anyhow::Result;

/// Resolves on SIGTERM/SIGINT (unix) or Ctrl+C/Ctrl+Break (windows).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::debug!("SIGTERM"),
            _ = sigint.recv() => tracing::debug!("SIGINT"),
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c};
        let mut c = ctrl_c()?;
        let mut br = ctrl_break()?;
        tokio::select! {
            _ = c.recv() => {},
            _ = br.recv() => {},
        }
        Ok(())
    }
}
