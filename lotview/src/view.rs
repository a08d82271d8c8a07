//! Components of the auction page.
//!
//! Each component returns a declarative description. Composite nodes capture
//! the data they render; `favorite_button` reads its inputs from props.

use std::rc::Rc;

use chrono::{DateTime, Local, Timelike};

use crate::core::builder::{Config, component, create_node};
use crate::core::node::{Callback, Element, NodeType, Props};
use crate::core::state::{AppState, Lot};

/// Side effects the page can request for a lot.
#[derive(Clone)]
pub struct LotHandlers {
    pub favorite: Rc<dyn Fn(u64)>,
    pub unfavorite: Rc<dyn Fn(u64)>,
}

impl LotHandlers {
    /// Handlers that do nothing, for static renders.
    pub fn inert() -> Self {
        Self {
            favorite: Rc::new(|_| {}),
            unfavorite: Rc::new(|_| {}),
        }
    }
}

pub fn app(state: &AppState, handlers: &LotHandlers) -> Element {
    let time = state.clock.time;
    let lots = state.auction.lots.clone();
    let handlers = handlers.clone();
    create_node(
        "div",
        Config::new().attr("class", "app"),
        vec![
            component(header),
            component(move || clock(time)),
            component(move || lot_list(lots.as_deref(), &handlers)),
        ],
    )
}

pub fn loading() -> Element {
    create_node("div", Config::new().attr("class", "loading"), vec!["Loading...".into()])
}

fn logo() -> Element {
    create_node(
        "img",
        Config::new().attr("class", "logo").attr("src", "logo.png"),
        Vec::new(),
    )
}

pub fn header() -> Element {
    create_node("header", Config::new().attr("class", "header"), vec![component(logo)])
}

/// Daytime spans 07:00 through 21:59.
pub fn clock(time: DateTime<Local>) -> Element {
    let is_day = (7..=21).contains(&time.hour());
    create_node(
        "div",
        Config::new().attr("class", "clock"),
        vec![
            create_node(
                "span",
                Config::new().attr("class", "value"),
                vec![time.format("%H:%M:%S").to_string().into()],
            ),
            create_node(
                "span",
                Config::new().attr("class", if is_day { "icon day" } else { "icon night" }),
                Vec::new(),
            ),
        ],
    )
}

/// Placeholder before the first load, otherwise one keyed item per lot.
pub fn lot_list(lots: Option<&[Rc<Lot>]>, handlers: &LotHandlers) -> Element {
    let Some(lots) = lots else {
        return component(loading);
    };
    let items = lots
        .iter()
        .map(|lot| {
            let config = Config::new().key(lot.id);
            let lot = Rc::clone(lot);
            let handlers = handlers.clone();
            create_node(
                NodeType::composite(move |_| lot_item(&lot, &handlers)),
                config,
                Vec::new(),
            )
        })
        .collect();
    create_node("div", Config::new().attr("class", "lots"), items)
}

pub fn lot_item(lot: &Lot, handlers: &LotHandlers) -> Element {
    let class = if lot.favorite { "lot favorite" } else { "lot" };
    let id = lot.id;
    let favorite = Rc::clone(&handlers.favorite);
    let unfavorite = Rc::clone(&handlers.unfavorite);
    create_node(
        "article",
        Config::new().attr("class", class),
        vec![
            create_node("div", Config::new().attr("class", "price"), vec![lot.price.into()]),
            create_node("h1", Config::new(), vec![lot.name.clone().into()]),
            create_node("p", Config::new(), vec![lot.description.clone().into()]),
            create_node(
                NodeType::composite(favorite_button),
                Config::new()
                    .attr("active", lot.favorite)
                    .attr("favorite", Callback::new(move || favorite(id)))
                    .attr("unfavorite", Callback::new(move || unfavorite(id))),
                Vec::new(),
            ),
        ],
    )
}

/// Toggle button; reads `active`, `favorite` and `unfavorite` from props.
pub fn favorite_button(props: &Props) -> Element {
    let active = props.flag("active");
    let (class, label, handler) = if active {
        ("unfavorite", "Unfavorite", props.handler("unfavorite"))
    } else {
        ("favorite", "Favorite", props.handler("favorite"))
    };
    let mut config = Config::new().attr("class", class);
    if let Some(handler) = handler {
        config = config.attr("onclick", handler.clone());
    }
    create_node("button", config, vec![label.into()])
}
