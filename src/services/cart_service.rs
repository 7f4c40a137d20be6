use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use rust_decimal::Decimal;

use crate::{
    dto::cart::{CartView, DrawerAction, Notice},
    models::{CartItem, Product},
    services::auth_service::{AuthListener, AuthState},
    storage::Storage,
};

#[derive(Debug, Clone, Copy)]
pub struct AddToCartOptions {
    pub open_drawer: bool,
}

impl Default for AddToCartOptions {
    fn default() -> Self {
        Self { open_drawer: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(CartItem),
    /// No session; the cart was left untouched.
    LoginRequired,
}

impl AddOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            AddOutcome::Added(item) => Notice::new(
                "Added to cart",
                format!("{} has been added to your cart", item.product.title),
            ),
            AddOutcome::LoginRequired => Notice::new(
                "Please login",
                "You need to login to add items to cart",
            ),
        }
    }
}

pub fn items_count(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

pub fn subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

#[derive(Debug, Default)]
struct CartState {
    items: Vec<CartItem>,
    is_open: bool,
    hydrated: bool,
    auth_hydrated: bool,
    authenticated: bool,
}

/// In-memory cart, written back to storage as a whole after every mutation
/// once hydrated. Learns about the session only through [`AuthListener`].
pub struct CartStore {
    storage: Storage,
    state: RwLock<CartState>,
}

impl CartStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            state: RwLock::new(CartState::default()),
        }
    }

    fn lock(&self) -> RwLockWriteGuard<'_, CartState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &CartState) {
        if state.hydrated {
            self.storage.save_cart(&state.items);
        }
    }

    pub fn hydrate(&self) {
        let mut state = self.lock();
        state.items = self.storage.get_cart();
        state.hydrated = true;
        tracing::debug!(items = state.items.len(), "cart hydrated");
        if state.auth_hydrated && !state.authenticated {
            self.reset(&mut state);
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .hydrated
    }

    pub fn add_to_cart(&self, product: Product, options: AddToCartOptions) -> AddOutcome {
        let mut state = self.lock();
        if !state.authenticated {
            tracing::debug!(product_id = product.id, "add to cart without session");
            return AddOutcome::LoginRequired;
        }

        let item = match state.items.iter().position(|item| item.id() == product.id) {
            Some(index) => {
                let existing = &mut state.items[index];
                existing.quantity = existing.quantity.saturating_add(1);
                existing.clone()
            }
            None => {
                let item = CartItem::new(product);
                state.items.push(item.clone());
                item
            }
        };
        tracing::debug!(product_id = item.id(), quantity = item.quantity, "cart item added");

        if options.open_drawer {
            state.is_open = true;
        }
        self.persist(&state);
        AddOutcome::Added(item)
    }

    /// Sets the quantity as given. Callers clamp to a minimum of one.
    pub fn update_quantity(&self, id: u64, quantity: u32) {
        let mut state = self.lock();
        for item in state.items.iter_mut().filter(|item| item.id() == id) {
            item.quantity = quantity;
        }
        tracing::debug!(product_id = id, quantity, "cart quantity updated");
        self.persist(&state);
    }

    pub fn remove_item(&self, id: u64) {
        let mut state = self.lock();
        state.items.retain(|item| item.id() != id);
        tracing::debug!(product_id = id, "cart item removed");
        self.persist(&state);
    }

    pub fn clear_cart(&self) {
        let mut state = self.lock();
        self.reset(&mut state);
    }

    fn reset(&self, state: &mut CartState) {
        state.items.clear();
        self.storage.clear_cart();
        tracing::debug!("cart cleared");
    }

    pub fn set_drawer(&self, action: DrawerAction) -> bool {
        let mut state = self.lock();
        state.is_open = match action {
            DrawerAction::Open => true,
            DrawerAction::Close => false,
            DrawerAction::Toggle => !state.is_open,
        };
        state.is_open
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .clone()
    }

    pub fn view(&self) -> CartView {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        CartView {
            items_count: items_count(&state.items),
            subtotal: subtotal(&state.items),
            items: state.items.clone(),
            is_open: state.is_open,
        }
    }
}

impl AuthListener for CartStore {
    fn auth_changed(&self, auth: &AuthState) {
        let mut state = self.lock();
        state.auth_hydrated = auth.is_hydrated();
        state.authenticated = auth.user().is_some();
        if state.hydrated && state.auth_hydrated && !state.authenticated {
            self.reset(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        models::{Rating, User},
        services::auth_service::AuthStore,
    };
    use uuid::Uuid;

    fn product(id: u64, cents: i64) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            price: Decimal::new(cents, 2),
            description: String::new(),
            category: "electronics".into(),
            image: String::new(),
            rating: Rating { rate: 3.5, count: 1 },
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "shopper@example.com".into(),
            name: "shopper".into(),
        }
    }

    fn session(storage: &Storage) -> (Arc<AuthStore>, Arc<CartStore>) {
        let auth = Arc::new(AuthStore::new(storage.clone()));
        let cart = Arc::new(CartStore::new(storage.clone()));
        auth.subscribe(cart.clone());
        cart.hydrate();
        auth.hydrate();
        (auth, cart)
    }

    #[test]
    fn same_product_twice_bumps_quantity() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        auth.login(user());

        cart.add_to_cart(product(1, 1000), AddToCartOptions::default());
        cart.add_to_cart(product(2, 250), AddToCartOptions::default());
        cart.add_to_cart(product(1, 1000), AddToCartOptions::default());

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].quantity, 1);
    }

    #[test]
    fn add_without_session_is_refused() {
        let storage = Storage::in_memory();
        let (_auth, cart) = session(&storage);

        let outcome = cart.add_to_cart(product(1, 1000), AddToCartOptions::default());
        assert_eq!(outcome, AddOutcome::LoginRequired);
        assert_eq!(outcome.notice().title, "Please login");
        assert!(cart.items().is_empty());
        assert!(storage.get_cart().is_empty());
        assert!(!cart.view().is_open);
    }

    #[test]
    fn derived_totals_follow_mutations() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        assert_eq!(cart.view().items_count, 0);
        assert_eq!(cart.view().subtotal, Decimal::ZERO);

        auth.login(user());
        cart.add_to_cart(product(1, 1999), AddToCartOptions::default());
        cart.add_to_cart(product(2, 500), AddToCartOptions::default());
        cart.update_quantity(1, 3);

        let view = cart.view();
        assert_eq!(view.items_count, 4);
        assert_eq!(view.subtotal, Decimal::new(6497, 2));
        assert_eq!(view.subtotal, subtotal(&cart.items()));

        cart.remove_item(1);
        assert_eq!(cart.view().subtotal, Decimal::new(500, 2));
        assert_eq!(cart.view().items_count, 1);
    }

    #[test]
    fn update_quantity_is_unchecked() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        auth.login(user());
        cart.add_to_cart(product(1, 100), AddToCartOptions::default());

        cart.update_quantity(1, 0);
        assert_eq!(cart.items()[0].quantity, 0);
        cart.update_quantity(99, 5);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn adding_to_a_maxed_line_saturates() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        auth.login(user());
        cart.add_to_cart(product(1, 100), AddToCartOptions::default());
        cart.update_quantity(1, u32::MAX);

        let outcome = cart.add_to_cart(product(1, 100), AddToCartOptions::default());
        let AddOutcome::Added(item) = outcome else {
            panic!("expected the add to succeed");
        };
        assert_eq!(item.quantity, u32::MAX);
        assert_eq!(storage.get_cart()[0].quantity, u32::MAX);
    }

    #[test]
    fn racing_login_and_logout_keep_cart_in_step() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);

        for round in 0..2_000 {
            std::thread::scope(|scope| {
                scope.spawn(|| auth.login(user()));
                scope.spawn(|| auth.logout());
            });

            let outcome = cart.add_to_cart(product(1, 100), AddToCartOptions::default());
            let logged_in = auth.current_user().is_some();
            assert_eq!(
                matches!(outcome, AddOutcome::Added(_)),
                logged_in,
                "round {round}"
            );
            if !logged_in {
                assert!(storage.get_cart().is_empty(), "round {round}");
            }
            auth.logout();
        }
    }

    #[test]
    fn remove_missing_item_is_noop() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        auth.login(user());
        cart.add_to_cart(product(1, 100), AddToCartOptions::default());
        cart.remove_item(42);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn mutations_write_back_and_reload() {
        let storage = Storage::in_memory();
        {
            let (auth, cart) = session(&storage);
            auth.login(user());
            cart.add_to_cart(product(3, 300), AddToCartOptions::default());
            cart.add_to_cart(product(1, 100), AddToCartOptions::default());
            cart.add_to_cart(product(3, 300), AddToCartOptions::default());
        }

        let (_auth, cart) = session(&storage);
        let items = cart.items();
        assert_eq!(items.iter().map(CartItem::id).collect::<Vec<_>>(), [3, 1]);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items, storage.get_cart());
    }

    #[test]
    fn logout_empties_cart_and_storage() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        auth.login(user());
        cart.add_to_cart(product(1, 100), AddToCartOptions::default());
        assert!(!storage.get_cart().is_empty());

        auth.logout();
        assert!(cart.items().is_empty());
        assert!(storage.get_cart().is_empty());
    }

    #[test]
    fn hydration_without_user_drops_stale_cart() {
        let storage = Storage::in_memory();
        storage.save_cart(&[CartItem::new(product(1, 100))]);

        let (_auth, cart) = session(&storage);
        assert!(cart.items().is_empty());
        assert!(storage.get_cart().is_empty());
    }

    #[test]
    fn hydration_order_does_not_matter() {
        let storage = Storage::in_memory();
        storage.save_user(&user());
        storage.save_cart(&[CartItem::new(product(1, 100))]);

        let auth = Arc::new(AuthStore::new(storage.clone()));
        let cart = Arc::new(CartStore::new(storage.clone()));
        auth.subscribe(cart.clone());
        auth.hydrate();
        cart.hydrate();
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn buy_now_leaves_drawer_closed() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        auth.login(user());

        cart.add_to_cart(product(1, 100), AddToCartOptions { open_drawer: false });
        assert!(!cart.view().is_open);
        cart.add_to_cart(product(1, 100), AddToCartOptions::default());
        assert!(cart.view().is_open);
        assert!(!cart.set_drawer(DrawerAction::Toggle));
        assert!(cart.set_drawer(DrawerAction::Open));
        assert!(!cart.set_drawer(DrawerAction::Close));
    }

    #[test]
    fn clear_cart_removes_persisted_value() {
        let storage = Storage::in_memory();
        let (auth, cart) = session(&storage);
        auth.login(user());
        cart.add_to_cart(product(1, 100), AddToCartOptions::default());

        cart.clear_cart();
        assert!(cart.items().is_empty());
        assert!(storage.get_cart().is_empty());
        assert_eq!(storage.read(crate::storage::CART_KEY, None::<Vec<CartItem>>), None);
    }
}
