//! Root driver: re-render the live tree on every state change.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::core::node::Element;
use crate::core::reconcile::{HostTree, Reconciler};
use crate::core::store::{Action, Store, Subscription};

/// Keeps a live tree in sync with a store.
///
/// Each store notification rebuilds the description with `view`, evaluates
/// it and reconciles it into `root`. The driver reaches the store through a
/// weak handle, so it never keeps the store alive.
#[derive(Debug)]
pub struct RootDriver {
    subscription: Subscription,
    renders: Rc<Cell<usize>>,
}

impl RootDriver {
    /// Render once, then subscribe for subsequent renders.
    pub fn mount<S, A, H>(
        store: &Store<S, A>,
        host: Rc<RefCell<H>>,
        root: H::Handle,
        reconciler: Reconciler,
        view: impl Fn(&S) -> Element + 'static,
    ) -> Result<Self>
    where
        S: 'static,
        A: Action + 'static,
        H: HostTree + 'static,
    {
        let renders = Rc::new(Cell::new(0));
        let pass = {
            let store = store.downgrade();
            let renders = Rc::clone(&renders);
            move || -> Result<()> {
                let Some(store) = store.upgrade() else {
                    return Ok(());
                };
                let state = store.get_state();
                let tree = view(&state);
                let mut host = host
                    .try_borrow_mut()
                    .map_err(|_| anyhow!("live tree is borrowed during render"))?;
                let summary = reconciler.render(&mut *host, &tree, root);
                renders.set(renders.get() + 1);
                debug!(
                    pass = renders.get(),
                    structural = summary.structural(),
                    attributes = summary.attributes_set + summary.attributes_removed,
                    texts = summary.texts_set,
                    "render pass"
                );
                Ok(())
            }
        };

        pass().context("initial render")?;
        let subscription = store.subscribe(pass);
        Ok(Self {
            subscription,
            renders,
        })
    }

    /// Number of completed render passes, the initial one included.
    pub fn renders(&self) -> usize {
        self.renders.get()
    }

    /// Stop re-rendering. The live tree keeps its last state.
    pub fn unmount(&self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::{AppAction, change_lot_price, set_lots};
    use crate::core::builder::{Config, create_node};
    use crate::core::reducers::app_reducer;
    use crate::core::state::AppState;
    use crate::io::host::{MemoryHost, NodeId};
    use crate::test_support::lot;

    fn price_list(state: &AppState) -> Element {
        let items = state
            .auction
            .lots
            .iter()
            .flatten()
            .map(|lot| create_node("li", Config::new().key(lot.id), vec![lot.price.into()]))
            .collect();
        create_node("ul", Config::new(), items)
    }

    struct Mounted {
        store: Store<AppState, AppAction>,
        host: Rc<RefCell<MemoryHost>>,
        root: NodeId,
        driver: RootDriver,
    }

    impl Mounted {
        fn markup(&self) -> String {
            self.host.borrow().to_markup(self.root)
        }
    }

    fn mounted() -> Mounted {
        let store = Store::with_default(app_reducer()).expect("store");
        let host = Rc::new(RefCell::new(MemoryHost::new()));
        let root = host.borrow_mut().create_root("div", "root");
        let driver = RootDriver::mount(
            &store,
            Rc::clone(&host),
            root,
            Reconciler::default(),
            price_list,
        )
        .expect("mount");
        Mounted {
            store,
            host,
            root,
            driver,
        }
    }

    #[test]
    fn mount_renders_immediately_and_on_dispatch() {
        let page = mounted();
        assert_eq!(page.driver.renders(), 1);
        assert_eq!(page.markup(), r#"<div id="root"><ul></ul></div>"#);

        page.store
            .dispatch(set_lots(vec![lot(1, 16.0), lot(2, 21.0)]))
            .expect("dispatch");
        page.store.dispatch(change_lot_price(2, 30.0)).expect("dispatch");
        assert_eq!(page.driver.renders(), 3);
        assert_eq!(
            page.markup(),
            r#"<div id="root"><ul><li data-key="1">16</li><li data-key="2">30</li></ul></div>"#
        );
    }

    #[test]
    fn unmount_stops_rendering() {
        let page = mounted();
        page.driver.unmount();
        page.store.dispatch(set_lots(vec![lot(1, 16.0)])).expect("dispatch");
        assert_eq!(page.driver.renders(), 1);
        assert_eq!(page.markup(), r#"<div id="root"><ul></ul></div>"#);
    }

    #[test]
    fn borrowed_host_fails_the_pass_but_not_the_dispatch() {
        let page = mounted();
        {
            let _held = page.host.borrow();
            page.store.dispatch(set_lots(vec![lot(1, 16.0)])).expect("dispatch");
        }
        assert_eq!(page.driver.renders(), 1);
        assert!(page.store.get_state().auction.lots.is_some());

        page.store.dispatch(change_lot_price(1, 17.0)).expect("dispatch");
        assert_eq!(page.driver.renders(), 2);
        assert!(page.markup().contains(">17<"));
    }
}
