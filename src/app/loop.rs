use crate::app::{
    action::Action, command::Command, executor, input::map_event_to_action, reducer,
    state::AppState, timing::DoubleTap, ui,
};
use crate::domain::host::TabHost;

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{backend::Backend, Terminal};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::interval;

const TICK_RATE: Duration = Duration::from_millis(250);

pub async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: AppState<'_>,
    host: Arc<dyn TabHost>,
) -> Result<()> {
    // Blocking reader feeding the async loop.
    let (event_tx, event_rx) = mpsc::channel(100);
    tokio::task::spawn_blocking(move || loop {
        match event::read() {
            Ok(evt) => {
                if event_tx.blocking_send(Ok(evt)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = event_tx.blocking_send(Err(e));
                break;
            }
        }
    });

    run_loop_with_events(terminal, app_state, host, event_rx).await
}

pub async fn run_loop_with_events<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app_state: AppState<'_>,
    host: Arc<dyn TabHost>,
    mut event_rx: mpsc::Receiver<Result<Event, std::io::Error>>,
) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::channel(100);
    let mut interval = interval(TICK_RATE);
    let mut toggle_taps = DoubleTap::default();

    // Initial fetch so the session pane has something to show.
    handle_command(Command::LoadInventory, host.clone(), action_tx.clone())?;

    loop {
        // --- 1. Render ---
        terminal.draw(|f| {
            ui::draw(f, &mut app_state);
        })?;

        // --- 2. Event handling ---
        let action = tokio::select! {
            _ = interval.tick() => Some(Action::Tick),

            // User input
            Some(res) = event_rx.recv() => {
                let event = match res {
                    Ok(e) => e,
                    Err(e) => return Err(e.into()),
                };
                map_event_to_action(event, &app_state, &mut toggle_taps, Instant::now(), terminal.size()?)
            },

            // Async results
            Some(a) = action_rx.recv() => Some(a),
        };

        // --- 3. Update (reducer) ---
        if let Some(action) = action {
            if let Action::Quit = action {
                break;
            }

            let command = reducer::update(&mut app_state, action);

            if app_state.should_quit {
                break;
            }

            if let Some(cmd) = command {
                handle_command(cmd, host.clone(), action_tx.clone())?;
            }
        }
    }

    Ok(())
}

/// Runs one side effect on a spawned task; the result comes back to the
/// reducer as an action. Fire-and-forget: the loop never blocks on the
/// host, and a completion landing after the palette closed is harmless.
pub(crate) fn handle_command(
    command: Command,
    host: Arc<dyn TabHost>,
    tx: mpsc::Sender<Action>,
) -> Result<()> {
    match command {
        Command::LoadInventory => {
            tokio::spawn(async move {
                let result = async {
                    let tabs = host.list_tabs().await?;
                    let groups = host.list_groups().await?;
                    let history = host.recent_history().await?;
                    anyhow::Ok((tabs, groups, history))
                }
                .await;
                match result {
                    Ok((tabs, groups, history)) => {
                        let _ = tx
                            .send(Action::InventoryLoaded {
                                tabs,
                                groups,
                                history,
                            })
                            .await;
                    }
                    Err(e) => {
                        tracing::warn!("inventory fetch failed: {e}");
                        let _ = tx
                            .send(Action::ErrorOccurred(format!("Failed to load tabs: {e}")))
                            .await;
                    }
                }
            });
        }
        Command::Execute { id, ctx } => {
            tokio::spawn(async move {
                let _ = tx.send(Action::ExecutionStarted(id)).await;
                let outcome = executor::execute(id, ctx, host).await;
                let _ = tx
                    .send(Action::ExecutionCompleted {
                        command: id,
                        outcome,
                    })
                    .await;
            });
        }
        Command::SwitchTab(id) => {
            tokio::spawn(async move {
                let result = async {
                    host.switch_to_tab(id).await?;
                    host.record_access(id).await
                }
                .await;
                let _ = tx
                    .send(Action::TabSwitched(result.map_err(|e| e.to_string())))
                    .await;
            });
        }
        Command::QuickClose(id) => {
            tokio::spawn(async move {
                let result = host.close_tabs(&[id]).await;
                let _ = tx
                    .send(Action::TabQuickClosed(result.map_err(|e| e.to_string())))
                    .await;
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "loop_tests.rs"]
mod tests;
