//! Orchestration of a full page run.
//!
//! Wires the store, the root driver, the data source, the price stream and
//! the clock together, drives them for a fixed duration and reports the final
//! live tree. Everything here runs on a single thread inside a `LocalSet`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::core::actions::{AppAction, change_lot_price, favorite_lot, set_lots, unfavorite_lot};
use crate::core::invariants::validate_lots;
use crate::core::reconcile::{KEY_ATTRIBUTE, ReconcileOptions, Reconciler};
use crate::core::reducers::app_reducer;
use crate::core::state::{AppState, Lot};
use crate::core::store::{Store, WeakStore};
use crate::driver::RootDriver;
use crate::io::api::{DataSource, SimulatedApi};
use crate::io::clock::start_clock;
use crate::io::config::AppConfig;
use crate::io::host::{MemoryHost, NodeId};
use crate::io::stream::{LiveStream, PriceUpdate, SimulatedStream};
use crate::io::task::TaskHandle;
use crate::view::{self, LotHandlers};

type AppStore = Store<AppState, AppAction>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub duration: Duration,
    /// Lot whose favorite button is clicked half way through the run.
    pub favorite: Option<u64>,
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunReport {
    pub markup: String,
    pub renders: usize,
    /// Price feeds that were running when the run ended.
    pub feeds: usize,
    pub state: Rc<AppState>,
}

/// Run the page against the simulated backend described by `cfg`.
///
/// Must be awaited inside a `LocalSet`.
pub async fn run_app(cfg: &AppConfig, options: &RunOptions) -> Result<RunReport> {
    let api = SimulatedApi::from_config(cfg).context("build data source")?;
    let stream = SimulatedStream::from_config(cfg).context("build price stream")?;
    run_with(Rc::new(api), Rc::new(stream), cfg, options).await
}

/// Run the page against arbitrary collaborators.
///
/// Fails before anything is spawned when `cfg` does not validate.
pub async fn run_with<D, L>(
    api: Rc<D>,
    stream: Rc<L>,
    cfg: &AppConfig,
    options: &RunOptions,
) -> Result<RunReport>
where
    D: DataSource + 'static,
    L: LiveStream + 'static,
{
    cfg.validate()?;
    let store = Store::with_default(app_reducer()).context("create store")?;
    let host = Rc::new(RefCell::new(MemoryHost::new()));
    let root = host.borrow_mut().create_root("div", "root");

    let handlers = LotHandlers {
        favorite: toggle_handler(&store, &api, true),
        unfavorite: toggle_handler(&store, &api, false),
    };
    let driver = RootDriver::mount(
        &store,
        Rc::clone(&host),
        root,
        Reconciler::new(cfg.reconciler),
        move |state| view::app(state, &handlers),
    )
    .context("mount page")?;
    info!(duration_ms = options.duration.as_millis() as u64, "run started");

    let clock = start_clock(&store, cfg.clock_interval())?;
    let feeds = Rc::new(RefCell::new(Vec::new()));
    let loader = TaskHandle::new(
        "loader",
        tokio::task::spawn_local(load_lots(
            Rc::clone(&api),
            Rc::clone(&stream),
            store.downgrade(),
            Rc::clone(&feeds),
        )),
    );

    match options.favorite {
        Some(id) => {
            let half = options.duration / 2;
            tokio::time::sleep(half).await;
            click_favorite(&host, root, id)?;
            tokio::time::sleep(options.duration - half).await;
        }
        None => tokio::time::sleep(options.duration).await,
    }

    loader.stop();
    clock.stop();
    let feeds = feeds.take();
    for feed in &feeds {
        feed.stop();
    }
    driver.unmount();

    let (markup, nodes) = {
        let host = host.borrow();
        (host.to_markup(root), host.node_count())
    };
    let report = RunReport {
        markup,
        renders: driver.renders(),
        feeds: feeds.len(),
        state: store.get_state(),
    };
    info!(renders = report.renders, feeds = report.feeds, nodes, "run finished");
    Ok(report)
}

/// Render the page once with `lots` loaded and return the markup.
pub fn render_once(lots: Vec<Lot>, options: ReconcileOptions) -> Result<String> {
    let problems = validate_lots(&lots);
    if !problems.is_empty() {
        bail!("invalid lots:\n- {}", problems.join("\n- "));
    }
    let store = Store::with_default(app_reducer()).context("create store")?;
    store.dispatch(set_lots(lots)).context("load lots")?;

    let host = Rc::new(RefCell::new(MemoryHost::new()));
    let root = host.borrow_mut().create_root("div", "root");
    let handlers = LotHandlers::inert();
    let driver = RootDriver::mount(
        &store,
        Rc::clone(&host),
        root,
        Reconciler::new(options),
        move |state| view::app(state, &handlers),
    )?;
    driver.unmount();
    let markup = host.borrow().to_markup(root);
    Ok(markup)
}

/// Fetch the lot list, publish it, then open one price feed per lot.
async fn load_lots<D, L>(
    api: Rc<D>,
    stream: Rc<L>,
    store: WeakStore<AppState, AppAction>,
    feeds: Rc<RefCell<Vec<TaskHandle>>>,
) where
    D: DataSource,
    L: LiveStream,
{
    let lots = match api.get("/lots").await {
        Ok(lots) => lots,
        Err(err) => {
            warn!(error = %err, "lot fetch failed");
            return;
        }
    };
    let problems = validate_lots(&lots);
    if !problems.is_empty() {
        warn!(?problems, "rejecting lot list");
        return;
    }
    let Some(store) = store.upgrade() else {
        return;
    };

    let ids: Vec<u64> = lots.iter().map(|lot| lot.id).collect();
    if let Err(err) = store.dispatch(set_lots(lots)) {
        warn!(error = %err, "publishing lots failed");
        return;
    }
    info!(count = ids.len(), "lots loaded");

    for id in ids {
        let channel = format!("price-{}", id);
        let target = store.downgrade();
        let callback = Box::new(move |update: PriceUpdate| {
            let Some(store) = target.upgrade() else {
                return;
            };
            if let Err(err) = store.dispatch(change_lot_price(update.id, update.price)) {
                warn!(error = %err, lot = update.id, "price update failed");
            }
        });
        match stream.subscribe(&channel, callback) {
            Some(feed) => feeds.borrow_mut().push(feed),
            None => warn!(%channel, "price channel not served"),
        }
    }
}

/// Post the toggle, then record it in the store once acknowledged.
fn toggle_handler<D>(store: &AppStore, api: &Rc<D>, favorite: bool) -> Rc<dyn Fn(u64)>
where
    D: DataSource + 'static,
{
    let store = store.downgrade();
    let api = Rc::clone(api);
    Rc::new(move |id| {
        let store = store.clone();
        let api = Rc::clone(&api);
        tokio::task::spawn_local(async move {
            let (route, action) = if favorite {
                ("favorite", favorite_lot(id))
            } else {
                ("unfavorite", unfavorite_lot(id))
            };
            let path = format!("/lots/{}/{}", id, route);
            if let Err(err) = api.post(&path).await {
                warn!(error = %err, %path, "toggle post failed");
                return;
            }
            let Some(store) = store.upgrade() else {
                return;
            };
            if let Err(err) = store.dispatch(action) {
                warn!(error = %err, lot = id, "toggle dispatch failed");
            }
        });
    })
}

/// Click the toggle button of the rendered lot `id`.
///
/// The handler is taken out before it runs so the live tree is not borrowed
/// while the handler works.
fn click_favorite(host: &RefCell<MemoryHost>, root: NodeId, id: u64) -> Result<()> {
    let handler = {
        let host = host.borrow();
        let item = host
            .find_by_attribute(root, KEY_ATTRIBUTE, &id.to_string())
            .with_context(|| format!("lot {} is not rendered", id))?;
        let button = host
            .find_descendant(item, "button")
            .with_context(|| format!("lot {} has no toggle button", id))?;
        host.handler(button, "onclick")
            .with_context(|| format!("lot {} toggle has no handler", id))?
    };
    handler.call();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::api::{Ack, RouteError};
    use crate::test_support::lot;
    use tokio::task::LocalSet;

    fn options(seconds: u64, favorite: Option<u64>) -> RunOptions {
        RunOptions {
            duration: Duration::from_secs(seconds),
            favorite,
        }
    }

    #[test]
    fn render_once_shows_every_lot() {
        let markup =
            render_once(vec![lot(1, 16.0), lot(2, 21.0)], ReconcileOptions::default())
                .expect("render");
        assert!(markup.starts_with(r#"<div id="root"><div class="app">"#));
        assert!(markup.contains(r#"<article class="lot" data-key="1">"#));
        assert!(markup.contains(r#"<div class="price">21</div>"#));
        assert!(!markup.contains("Loading..."));
    }

    #[test]
    fn render_once_rejects_duplicate_ids() {
        let err = render_once(vec![lot(1, 16.0), lot(1, 21.0)], ReconcileOptions::default())
            .expect_err("duplicate ids");
        assert!(err.to_string().contains("duplicate lot id 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_loads_lots_and_streams_prices() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let report = run_app(&AppConfig::default(), &options(3, None))
                    .await
                    .expect("run");
                assert_eq!(report.feeds, 2);
                let lots = report.state.auction.lots.as_ref().expect("lots loaded");
                assert_eq!(lots.len(), 2);
                assert!(lots.iter().all(|lot| (30.0..=40.0).contains(&lot.price)));
                assert!(report.markup.contains("Apple"));
                assert!(report.renders > 3);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn placeholder_stays_until_fetch_completes() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let cfg = AppConfig {
                    fetch_delay_ms: 5000,
                    ..AppConfig::default()
                };
                let report = run_app(&cfg, &options(1, None)).await.expect("run");
                assert!(report.state.auction.lots.is_none());
                assert!(report.markup.contains(r#"<div class="loading">Loading...</div>"#));
                assert_eq!(report.feeds, 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn clicking_favorite_marks_the_lot_after_acknowledgement() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let report = run_app(&AppConfig::default(), &options(4, Some(2)))
                    .await
                    .expect("run");
                let lots = report.state.auction.lots.as_ref().expect("lots loaded");
                assert!(lots.iter().all(|lot| lot.favorite));
                assert!(report.markup.contains(r#"<article class="lot favorite" data-key="2">"#));
                assert_eq!(report.markup.matches("Unfavorite").count(), 2);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn clicking_an_unrendered_lot_fails_the_run() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let err = run_app(&AppConfig::default(), &options(4, Some(9)))
                    .await
                    .expect_err("lot 9 does not exist");
                assert!(err.to_string().contains("lot 9 is not rendered"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_clock_interval_fails_before_running() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let cfg = AppConfig {
                    clock_interval_ms: 0,
                    ..AppConfig::default()
                };
                let stream = SimulatedStream::from_config(&AppConfig::default()).expect("stream");
                let api = SimulatedApi::from_config(&cfg).expect("api");
                let err = run_with(Rc::new(api), Rc::new(stream), &cfg, &options(2, None))
                    .await
                    .expect_err("invalid config");
                assert!(err.to_string().contains("clock_interval_ms"));
            })
            .await;
    }

    struct Offline;

    impl DataSource for Offline {
        async fn get(&self, path: &str) -> Result<Vec<Lot>, RouteError> {
            Err(RouteError::UnknownAddress(path.to_string()))
        }

        async fn post(&self, path: &str) -> Result<Ack, RouteError> {
            Err(RouteError::UnknownAddress(path.to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_leaves_placeholder() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let cfg = AppConfig::default();
                let stream = SimulatedStream::from_config(&cfg).expect("stream");
                let report = run_with(Rc::new(Offline), Rc::new(stream), &cfg, &options(2, None))
                    .await
                    .expect("run");
                assert!(report.markup.contains("Loading..."));
                assert_eq!(report.feeds, 0);
            })
            .await;
    }
}
