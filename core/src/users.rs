//! Fluent builder for the `users` resource.
//!
//! ```no_run
//! use helpdesk_core::{HelpdeskClient, Options, User};
//!
//! # fn main() -> Result<(), helpdesk_core::ApiError> {
//! let client = HelpdeskClient::connect("https://acme.example.com/api/v2");
//!
//! let everyone = client.users().per_page(100).fetch()?;          // GET users?per_page=100
//! let bob = client.user(123).fetch()?;                           // GET users/123
//! let bobs = client.users_matching("Bob").fetch()?;              // GET users?query=Bob
//! let me = client.users().me().fetch()?;                         // GET users/current
//! let ids = client.user(123).identities().fetch()?;              // GET users/123/user_identities
//!
//! client.users().create(&User::named("Mr. Miyagi"))?;           // POST users
//! client.user(123).update_with(|u| {                             // PUT users/123
//!     u.insert("email".into(), "hongkong@phooey.com".into());
//! })?;
//! client.user(123).delete(Options::new())?;                      // DELETE users/123
//! # Ok(())
//! # }
//! ```
//!
//! Chained methods take the builder by value, so a configuration can never
//! be shared between two chains. Nothing is sent until a terminal action
//! (`fetch`, `create`, `update`, `delete`) consumes the builder.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{HelpdeskClient, Options};
use crate::collection::Collection;
use crate::error::ApiError;
use crate::transport::Transport;

pub const USERS_PATH: &str = "users";
pub const USER_KEY: &str = "user";

/// Which part of the users resource an accessor call addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    /// The collection listing.
    #[default]
    All,
    /// A single user.
    Id(u64),
    /// The collection filtered by free text matched against name and email.
    Search(String),
}

impl Selector {
    /// Empty search text selects the whole collection. Any other text,
    /// whitespace included, is sent as the query unchanged.
    pub fn search(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Selector::All
        } else {
            Selector::Search(text)
        }
    }

    fn into_collection(self, options: Options) -> Collection {
        match self {
            Selector::All => Collection::with_options(USERS_PATH, options),
            Selector::Id(id) => Collection::with_options(format!("{USERS_PATH}/{id}"), options),
            Selector::Search(text) => {
                let mut collection = Collection::with_options(USERS_PATH, options);
                collection.set_query(&text);
                collection
            }
        }
    }
}

impl From<u64> for Selector {
    fn from(id: u64) -> Self {
        Selector::Id(id)
    }
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Selector::search(text)
    }
}

impl From<String> for Selector {
    fn from(text: String) -> Self {
        Selector::search(text)
    }
}

impl<S: Into<Selector>> From<Option<S>> for Selector {
    fn from(selector: Option<S>) -> Self {
        selector.map_or(Selector::All, Into::into)
    }
}

impl<T: Transport> HelpdeskClient<T> {
    /// General accessor: `users_with(123u64, opts)`, `users_with("Bob", opts)`,
    /// `users_with(Selector::All, opts)`.
    pub fn users_with(
        &self,
        selector: impl Into<Selector>,
        options: Options,
    ) -> UsersCollection<'_, T> {
        UsersCollection {
            client: self,
            collection: selector.into().into_collection(options),
        }
    }

    pub fn users(&self) -> UsersCollection<'_, T> {
        self.users_with(Selector::All, Options::new())
    }

    pub fn user(&self, id: u64) -> UsersCollection<'_, T> {
        self.users_with(Selector::Id(id), Options::new())
    }

    pub fn users_matching(&self, text: &str) -> UsersCollection<'_, T> {
        self.users_with(Selector::search(text), Options::new())
    }

    /// Alias for [`users`](Self::users).
    pub fn people(&self) -> UsersCollection<'_, T> {
        self.users()
    }

    /// Alias for [`users_with`](Self::users_with).
    pub fn people_with(
        &self,
        selector: impl Into<Selector>,
        options: Options,
    ) -> UsersCollection<'_, T> {
        self.users_with(selector, options)
    }
}

/// A not-yet-sent request against the users resource.
#[must_use = "builders do nothing until a terminal action is called"]
#[derive(Debug)]
pub struct UsersCollection<'c, T> {
    client: &'c HelpdeskClient<T>,
    collection: Collection,
}

impl<'c, T: Transport> UsersCollection<'c, T> {
    pub fn path(&self) -> &str {
        self.collection.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.collection.query()
    }

    pub fn options(&self) -> &Options {
        self.collection.options()
    }

    /// The currently authenticated user.
    pub fn current(mut self) -> Self {
        self.collection.push_segment("current");
        self
    }

    /// Alias for [`current`](Self::current).
    pub fn me(self) -> Self {
        self.current()
    }

    /// Email addresses, twitter handles and other identities of a user.
    pub fn identities(mut self) -> Self {
        self.collection.push_segment("user_identities");
        self
    }

    pub fn per_page(self, n: u32) -> Self {
        self.option("per_page", n)
    }

    pub fn page(self, n: u32) -> Self {
        self.option("page", n)
    }

    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.collection.set_option(key, value.into());
        self
    }

    /// GET the accumulated path with the accumulated options as query.
    pub fn fetch(self) -> Result<Value, ApiError> {
        let (path, query) = self.collection.into_request();
        debug!(%path, "fetching users");
        self.client.do_get(&path, &query)
    }

    /// Like [`fetch`](Self::fetch), decoded into `D` (e.g. `UsersPage`).
    pub fn fetch_as<D: DeserializeOwned>(self) -> Result<D, ApiError> {
        let value = self.fetch()?;
        serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// POST `{user: data}` merged over the accumulated options.
    pub fn create<D: Serialize + ?Sized>(self, data: &D) -> Result<Value, ApiError> {
        let data = to_options(data)?;
        self.send_create(data)
    }

    /// Like [`create`](Self::create), with the payload filled in by `configure`
    /// starting from an empty map.
    pub fn create_with<F: FnOnce(&mut Options)>(self, configure: F) -> Result<Value, ApiError> {
        let mut data = Options::new();
        configure(&mut data);
        self.send_create(data)
    }

    /// PUT `{user: data}` merged over the accumulated options.
    pub fn update<D: Serialize + ?Sized>(self, data: &D) -> Result<Value, ApiError> {
        let data = to_options(data)?;
        self.send_update(data)
    }

    pub fn update_with<F: FnOnce(&mut Options)>(self, configure: F) -> Result<Value, ApiError> {
        let mut data = Options::new();
        configure(&mut data);
        self.send_update(data)
    }

    /// DELETE the accumulated path. Only `options` are sent as query; options
    /// given to the accessor are not.
    pub fn delete(self, options: Options) -> Result<Value, ApiError> {
        let (path, _) = self.collection.into_request();
        debug!(%path, "deleting user");
        self.client.do_delete(&path, &options)
    }

    fn send_create(self, data: Options) -> Result<Value, ApiError> {
        let (path, body) = self.collection.into_payload(USER_KEY, data);
        debug!(%path, "creating user");
        self.client.do_post(&path, &body)
    }

    fn send_update(self, data: Options) -> Result<Value, ApiError> {
        let (path, body) = self.collection.into_payload(USER_KEY, data);
        debug!(%path, "updating user");
        self.client.do_put(&path, &body)
    }
}

fn to_options<D: Serialize + ?Sized>(data: &D) -> Result<Options, ApiError> {
    match serde_json::to_value(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::SerializationError(format!(
            "user payload must be a JSON object, got {other}"
        ))),
        Err(e) => Err(ApiError::SerializationError(e.to_string())),
    }
}
