//! [`Navigation`]-related definitions.

use axum::Json;
use serde::Serialize;
use service::read::navigation;

use crate::{Context, Error};

/// Navigation menu available to the current session.
#[derive(Clone, Debug, Serialize)]
pub struct Navigation {
    /// Items of the main menu.
    pub items: Vec<Item>,

    /// Account item, either a login or a profile link.
    pub account: Item,
}

impl From<navigation::Navigation> for Navigation {
    fn from(nav: navigation::Navigation) -> Self {
        let navigation::Navigation { items, account } = nav;
        Self {
            items: items.iter().copied().map(Into::into).collect(),
            account: account.into(),
        }
    }
}

/// Single link of a [`Navigation`] menu.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Item {
    /// Text of this [`Item`].
    pub label: &'static str,

    /// Path this [`Item`] leads to.
    pub href: &'static str,
}

impl From<navigation::Item> for Item {
    fn from(item: navigation::Item) -> Self {
        let navigation::Item { label, href } = item;
        Self { label, href }
    }
}

/// Returns the [`Navigation`] of the current session.
///
/// Anonymous requests are served the public menu.
#[tracing::instrument(skip_all)]
pub async fn get(ctx: Context) -> Result<Json<Navigation>, Error> {
    let session = ctx.try_current_session().await?;
    Ok(Json(
        navigation::Navigation::for_session(session.as_ref()).into(),
    ))
}
