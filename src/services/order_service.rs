//! Simulated checkout. Payment is a fixed delay, not a gateway call, and
//! cannot fail.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::{
    dto::{
        cart::Notice,
        orders::{CheckoutPreview, OrderSummary},
    },
    error::{AppError, AppResult},
    models::{Order, OrderStatus},
    services::{
        auth_service::AuthStore,
        cart_service::{self, CartStore},
    },
    storage::Storage,
};

pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_secs(2);

const FREE_SHIPPING_OVER: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
const FLAT_SHIPPING: Decimal = Decimal::from_parts(999, 0, 0, false, 2);
const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Rounds half away from zero to whole cents and fixes the scale at two,
/// so `5` prints as `5.00`.
fn to_cents(amount: Decimal) -> Decimal {
    let mut cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(2);
    cents
}

pub fn summarize(subtotal: Decimal) -> OrderSummary {
    let shipping = if subtotal > FREE_SHIPPING_OVER {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING
    };
    let tax = to_cents(subtotal * TAX_RATE);
    OrderSummary {
        subtotal: to_cents(subtotal),
        shipping: to_cents(shipping),
        tax,
        total: to_cents(subtotal + shipping + tax),
        free_shipping: shipping.is_zero(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    Processing,
    Completed,
}

#[derive(Debug)]
pub enum CheckoutOutcome<T> {
    Ready(T),
    /// Preconditions failed; the caller is sent elsewhere.
    Redirect {
        location: &'static str,
        notice: Option<Notice>,
    },
}

pub struct CheckoutFlow {
    storage: Storage,
    auth: Arc<AuthStore>,
    cart: Arc<CartStore>,
    delay: Duration,
    phase: Arc<Mutex<CheckoutPhase>>,
}

/// Puts the flow back to idle if a checkout is dropped mid-payment.
struct ProcessingGuard {
    phase: Arc<Mutex<CheckoutPhase>>,
    done: bool,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        if !self.done {
            *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = CheckoutPhase::Idle;
        }
    }
}

impl CheckoutFlow {
    pub fn new(
        storage: Storage,
        auth: Arc<AuthStore>,
        cart: Arc<CartStore>,
        delay: Duration,
    ) -> Self {
        Self {
            storage,
            auth,
            cart,
            delay,
            phase: Arc::new(Mutex::new(CheckoutPhase::Idle)),
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_preconditions<T>(&self) -> Result<(), CheckoutOutcome<T>> {
        if self.auth.current_user().is_none() {
            return Err(CheckoutOutcome::Redirect {
                location: "/auth",
                notice: None,
            });
        }
        if self.cart.items().is_empty() {
            return Err(CheckoutOutcome::Redirect {
                location: "/products",
                notice: Some(Notice::new(
                    "Cart is empty",
                    "Add some items to your cart first",
                )),
            });
        }
        Ok(())
    }

    pub fn preview(&self) -> CheckoutOutcome<CheckoutPreview> {
        if let Err(redirect) = self.check_preconditions() {
            return redirect;
        }
        let items = self.cart.items();
        let summary = summarize(cart_service::subtotal(&items));
        CheckoutOutcome::Ready(CheckoutPreview { items, summary })
    }

    pub async fn place_order(&self) -> AppResult<CheckoutOutcome<Order>> {
        if let Err(redirect) = self.check_preconditions() {
            tracing::debug!("checkout preconditions not met");
            let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
            // A running checkout keeps its phase.
            if *phase == CheckoutPhase::Completed {
                *phase = CheckoutPhase::Idle;
            }
            return Ok(redirect);
        }

        let mut guard = {
            let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
            if *phase == CheckoutPhase::Processing {
                return Err(AppError::Conflict("checkout already in progress".into()));
            }
            *phase = CheckoutPhase::Processing;
            ProcessingGuard {
                phase: Arc::clone(&self.phase),
                done: false,
            }
        };

        let items = self.cart.items();
        let summary = summarize(cart_service::subtotal(&items));
        tracing::info!(items = items.len(), total = %summary.total, "processing payment");

        tokio::time::sleep(self.delay).await;

        let order = Order {
            id: build_order_id(),
            items,
            total: summary.total,
            date: Utc::now(),
            status: OrderStatus::Completed,
        };
        self.storage.save_order(&order);
        self.cart.clear_cart();

        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = CheckoutPhase::Completed;
        guard.done = true;
        tracing::info!(order_id = %order.id, "order placed");

        Ok(CheckoutOutcome::Ready(order))
    }

    pub fn orders(&self) -> Vec<Order> {
        self.storage.get_orders()
    }
}

fn build_order_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Product, Rating, User},
        services::cart_service::AddToCartOptions,
    };

    fn product(id: u64, cents: i64) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            price: Decimal::new(cents, 2),
            description: String::new(),
            category: "jewelery".into(),
            image: String::new(),
            rating: Rating { rate: 5.0, count: 2 },
        }
    }

    fn setup(delay: Duration) -> (Storage, Arc<AuthStore>, Arc<CartStore>, Arc<CheckoutFlow>) {
        let storage = Storage::in_memory();
        let auth = Arc::new(AuthStore::new(storage.clone()));
        let cart = Arc::new(CartStore::new(storage.clone()));
        auth.subscribe(cart.clone());
        cart.hydrate();
        auth.hydrate();
        let flow = Arc::new(CheckoutFlow::new(
            storage.clone(),
            auth.clone(),
            cart.clone(),
            delay,
        ));
        (storage, auth, cart, flow)
    }

    fn login(auth: &AuthStore) {
        auth.login(User {
            id: Uuid::new_v4(),
            email: "buyer@example.com".into(),
            name: "buyer".into(),
        });
    }

    #[test]
    fn summary_over_threshold_ships_free() {
        let summary = summarize(Decimal::new(15000, 2));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.tax, Decimal::new(1500, 2));
        assert_eq!(summary.total, Decimal::new(16500, 2));
        assert!(summary.free_shipping);
    }

    #[test]
    fn summary_under_threshold_charges_shipping() {
        let summary = summarize(Decimal::new(5000, 2));
        assert_eq!(summary.shipping, Decimal::new(999, 2));
        assert_eq!(summary.tax, Decimal::new(500, 2));
        assert_eq!(summary.total, Decimal::new(6499, 2));
        assert!(!summary.free_shipping);
    }

    #[test]
    fn amounts_print_to_the_cent() {
        let summary = summarize(Decimal::new(5000, 2));
        assert_eq!(summary.tax.to_string(), "5.00");
        assert_eq!(summary.total.to_string(), "64.99");

        let summary = summarize(Decimal::new(165, 1));
        assert_eq!(summary.tax.to_string(), "1.65");
        assert_eq!(summary.total.to_string(), "28.14");

        // 10% of 0.05 is half a cent.
        assert_eq!(summarize(Decimal::new(5, 2)).tax.to_string(), "0.01");
        assert_eq!(summarize(Decimal::new(15000, 2)).shipping.to_string(), "0.00");
    }

    #[test]
    fn exactly_one_hundred_is_not_free() {
        assert_eq!(summarize(Decimal::new(100, 0)).shipping, FLAT_SHIPPING);
    }

    #[tokio::test]
    async fn empty_cart_redirects_without_order() {
        let (storage, auth, _cart, flow) = setup(Duration::ZERO);
        login(&auth);

        let outcome = flow.place_order().await.unwrap();
        assert!(matches!(
            outcome,
            CheckoutOutcome::Redirect {
                location: "/products",
                ..
            }
        ));
        assert_eq!(flow.phase(), CheckoutPhase::Idle);
        assert!(storage.get_orders().is_empty());
    }

    #[tokio::test]
    async fn anonymous_checkout_redirects_to_auth() {
        let (_storage, _auth, _cart, flow) = setup(Duration::ZERO);
        assert!(matches!(
            flow.preview(),
            CheckoutOutcome::Redirect {
                location: "/auth",
                notice: None
            }
        ));
        assert!(matches!(
            flow.place_order().await.unwrap(),
            CheckoutOutcome::Redirect { location: "/auth", .. }
        ));
    }

    #[tokio::test]
    async fn completed_checkout_records_order_and_empties_cart() {
        let (storage, auth, cart, flow) = setup(Duration::ZERO);
        login(&auth);
        cart.add_to_cart(product(1, 5000), AddToCartOptions::default());

        let CheckoutOutcome::Ready(order) = flow.place_order().await.unwrap() else {
            panic!("expected an order");
        };
        assert!(order.id.starts_with("ORD-"));
        assert_eq!(order.total, Decimal::new(6499, 2));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.items.len(), 1);

        assert_eq!(flow.phase(), CheckoutPhase::Completed);
        assert!(cart.items().is_empty());
        assert!(storage.get_cart().is_empty());
        assert_eq!(storage.get_orders(), vec![order]);
    }

    #[tokio::test]
    async fn redirected_attempt_after_completion_is_idle() {
        let (_storage, auth, cart, flow) = setup(Duration::ZERO);
        login(&auth);
        cart.add_to_cart(product(1, 1000), AddToCartOptions::default());
        flow.place_order().await.unwrap();
        assert_eq!(flow.phase(), CheckoutPhase::Completed);

        let outcome = flow.place_order().await.unwrap();
        assert!(matches!(
            outcome,
            CheckoutOutcome::Redirect {
                location: "/products",
                ..
            }
        ));
        assert_eq!(flow.phase(), CheckoutPhase::Idle);
    }

    #[tokio::test]
    async fn newest_order_comes_first() {
        let (_storage, auth, cart, flow) = setup(Duration::ZERO);
        login(&auth);

        cart.add_to_cart(product(1, 1000), AddToCartOptions::default());
        flow.place_order().await.unwrap();
        cart.add_to_cart(product(2, 2000), AddToCartOptions::default());
        let CheckoutOutcome::Ready(second) = flow.place_order().await.unwrap() else {
            panic!("expected an order");
        };

        let orders = flow.orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_ne!(orders[0].id, orders[1].id);
    }

    #[tokio::test(start_paused = true)]
    async fn second_submission_while_processing_is_rejected() {
        let (_storage, auth, cart, flow) = setup(Duration::from_secs(2));
        login(&auth);
        cart.add_to_cart(product(1, 1000), AddToCartOptions::default());

        let first = tokio::spawn({
            let flow = flow.clone();
            async move { flow.place_order().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(flow.phase(), CheckoutPhase::Processing);

        assert!(matches!(
            flow.place_order().await,
            Err(AppError::Conflict(_))
        ));

        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Ready(_)));
        assert_eq!(flow.orders().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_checkout_returns_to_idle() {
        let (storage, auth, cart, flow) = setup(Duration::from_secs(2));
        login(&auth);
        cart.add_to_cart(product(1, 1000), AddToCartOptions::default());

        let _ = tokio::time::timeout(Duration::from_millis(10), flow.place_order()).await;
        assert_eq!(flow.phase(), CheckoutPhase::Idle);
        assert!(storage.get_orders().is_empty());
        assert_eq!(cart.items().len(), 1);
    }
}
