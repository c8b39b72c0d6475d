//! End-to-end matching scenarios through the `Marketplace` facade.

use agora_core::{OrderStatus, Price, Product, Side, Volume};
use agora_engine::{EngineConfig, Marketplace, MatchCompletion, PlaceOrderCommand};
use agora_engine::{EngineError, ManualClock};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;
use uuid::Uuid;

async fn marketplace() -> (Marketplace<ManualClock>, Product) {
    let mut config = EngineConfig::default();
    config.products.push(agora_engine::ProductConfig::new("Crude Oil"));
    let market = Marketplace::fixed_time(config);
    let product = market.products().await[0].clone();
    (market, product)
}

fn order(
    product: &Product,
    owner: Uuid,
    side: Side,
    price: Decimal,
    volume: Decimal,
) -> PlaceOrderCommand {
    PlaceOrderCommand {
        product_id: product.id,
        owner_id: owner,
        side,
        price,
        volume,
    }
}

#[tokio::test]
async fn partial_fill_against_deeper_resting_order() {
    let (market, product) = marketplace().await;
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();

    let resting = market
        .place_order(order(&product, seller, Side::Sell, dec!(10), dec!(100)))
        .await
        .unwrap();
    assert!(resting.trades.is_empty());
    assert_eq!(resting.order.status, OrderStatus::Pending);

    market.clock.advance(chrono::Duration::seconds(1));

    let taken = market
        .place_order(order(&product, buyer, Side::Buy, dec!(12), dec!(50)))
        .await
        .unwrap();

    assert_eq!(taken.trades.len(), 1);
    assert_eq!(taken.trades[0].price, Price::from(dec!(10)));
    assert_eq!(taken.trades[0].volume, Volume::from(dec!(50)));
    assert_eq!(taken.trades[0].buyer_id, buyer);
    assert_eq!(taken.trades[0].seller_id, seller);
    assert_eq!(taken.order.status, OrderStatus::Filled);
    assert_eq!(taken.completion, MatchCompletion::Complete);
    assert!(taken.remaining.is_zero());

    let maker = market.order(resting.order.id).await.unwrap().unwrap();
    assert_eq!(maker.filled, Volume::from(dec!(50)));
    assert_eq!(maker.status, OrderStatus::PartiallyFilled);
}

#[tokio::test]
async fn equal_prices_fill_first_come_first_served() {
    let (market, product) = marketplace().await;
    let buyer = Uuid::new_v4();

    let first = market
        .place_order(order(&product, Uuid::new_v4(), Side::Sell, dec!(9), dec!(20)))
        .await
        .unwrap();

    market.clock.advance(chrono::Duration::seconds(1));

    let second = market
        .place_order(order(&product, Uuid::new_v4(), Side::Sell, dec!(9), dec!(30)))
        .await
        .unwrap();

    market.clock.advance(chrono::Duration::seconds(1));

    let taken = market
        .place_order(order(&product, buyer, Side::Buy, dec!(9), dec!(40)))
        .await
        .unwrap();

    assert_eq!(taken.trades.len(), 2);
    assert_eq!(taken.trades[0].seller_id, first.order.owner_id);
    assert_eq!(taken.trades[0].volume, Volume::from(dec!(20)));
    assert_eq!(taken.trades[1].seller_id, second.order.owner_id);
    assert_eq!(taken.trades[1].volume, Volume::from(dec!(20)));

    let first_maker = market.order(first.order.id).await.unwrap().unwrap();
    let second_maker = market.order(second.order.id).await.unwrap().unwrap();
    assert_eq!(first_maker.status, OrderStatus::Filled);
    assert_eq!(second_maker.status, OrderStatus::PartiallyFilled);
    assert_eq!(second_maker.filled, Volume::from(dec!(20)));
}

#[tokio::test]
async fn same_owner_never_trades_with_itself() {
    let (market, product) = marketplace().await;
    let owner = Uuid::new_v4();

    market
        .place_order(order(&product, owner, Side::Sell, dec!(15), dec!(10)))
        .await
        .unwrap();

    market.clock.advance(chrono::Duration::seconds(1));

    let taken = market
        .place_order(order(&product, owner, Side::Buy, dec!(15), dec!(10)))
        .await
        .unwrap();

    assert!(taken.trades.is_empty());
    assert_eq!(taken.order.status, OrderStatus::Pending);
    assert_eq!(taken.remaining, Volume::from(dec!(10)));
}

#[tokio::test]
async fn non_crossing_prices_leave_both_orders_resting() {
    let (market, product) = marketplace().await;

    market
        .place_order(order(&product, Uuid::new_v4(), Side::Sell, dec!(20), dec!(10)))
        .await
        .unwrap();

    let taken = market
        .place_order(order(&product, Uuid::new_v4(), Side::Buy, dec!(15), dec!(10)))
        .await
        .unwrap();

    assert!(taken.trades.is_empty());
    assert_eq!(taken.order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn exact_match_fills_both_sides() {
    let (market, product) = marketplace().await;

    let resting = market
        .place_order(order(&product, Uuid::new_v4(), Side::Buy, dec!(8), dec!(5)))
        .await
        .unwrap();

    market.clock.advance(chrono::Duration::seconds(1));

    let taken = market
        .place_order(order(&product, Uuid::new_v4(), Side::Sell, dec!(8), dec!(5)))
        .await
        .unwrap();

    assert_eq!(taken.trades.len(), 1);
    assert_eq!(taken.trades[0].price, Price::from(dec!(8)));
    assert_eq!(taken.trades[0].volume, Volume::from(dec!(5)));
    assert_eq!(taken.order.status, OrderStatus::Filled);

    let maker = market.order(resting.order.id).await.unwrap().unwrap();
    assert_eq!(maker.status, OrderStatus::Filled);
}

#[tokio::test]
async fn taker_sweeps_multiple_price_levels_at_maker_prices() {
    let (market, product) = marketplace().await;
    let buyer = Uuid::new_v4();

    for (price, volume) in [(dec!(11), dec!(10)), (dec!(10), dec!(10))] {
        market
            .place_order(order(&product, Uuid::new_v4(), Side::Sell, price, volume))
            .await
            .unwrap();
        market.clock.advance(chrono::Duration::seconds(1));
    }

    let taken = market
        .place_order(order(&product, buyer, Side::Buy, dec!(12), dec!(15)))
        .await
        .unwrap();

    // Cheapest maker first, each trade at the maker's own price.
    assert_eq!(taken.trades.len(), 2);
    assert_eq!(taken.trades[0].price, Price::from(dec!(10)));
    assert_eq!(taken.trades[0].volume, Volume::from(dec!(10)));
    assert_eq!(taken.trades[1].price, Price::from(dec!(11)));
    assert_eq!(taken.trades[1].volume, Volume::from(dec!(5)));
    assert_eq!(taken.order.status, OrderStatus::Filled);

    // Volume conservation: the taker's fill equals the sum of its trades.
    let traded: Decimal = taken.trades.iter().map(|t| t.volume.inner()).sum();
    assert_eq!(taken.order.filled.inner(), traded);
}

#[tokio::test]
async fn validation_rejects_before_any_state_changes() {
    let (market, product) = marketplace().await;
    let owner = Uuid::new_v4();

    let bad_price = market
        .place_order(order(&product, owner, Side::Buy, dec!(0), dec!(10)))
        .await;
    assert!(matches!(bad_price, Err(EngineError::Validation(_))));

    let bad_volume = market
        .place_order(order(&product, owner, Side::Buy, dec!(10), dec!(-2)))
        .await;
    assert!(matches!(bad_volume, Err(EngineError::Validation(_))));

    let unknown_product = market
        .place_order(PlaceOrderCommand {
            product_id: Uuid::new_v4(),
            owner_id: owner,
            side: Side::Buy,
            price: dec!(10),
            volume: dec!(10),
        })
        .await;
    assert!(matches!(
        unknown_product,
        Err(EngineError::ProductNotFound(_))
    ));

    assert!(market.orders_for_user(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_rules_follow_ownership_and_status() {
    let (market, product) = marketplace().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let placed = market
        .place_order(order(&product, owner, Side::Sell, dec!(10), dec!(10)))
        .await
        .unwrap();
    let order_id = placed.order.id;

    let denied = market.cancel_order(order_id, stranger).await;
    assert!(matches!(denied, Err(EngineError::NotOrderOwner)));

    let cancelled = market.cancel_order(order_id, owner).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // A cancelled order no longer rests in the book.
    market.clock.advance(chrono::Duration::seconds(1));
    let taken = market
        .place_order(order(&product, stranger, Side::Buy, dec!(10), dec!(10)))
        .await
        .unwrap();
    assert!(taken.trades.is_empty());

    let again = market.cancel_order(order_id, owner).await;
    assert!(matches!(again, Err(EngineError::NotCancellable(_))));
}

#[tokio::test]
async fn counterparties_receive_trade_notifications() {
    let (market, product) = marketplace().await;
    let mut notifications = market.subscribe_product(product.id);

    market
        .place_order(order(&product, Uuid::new_v4(), Side::Sell, dec!(10), dec!(5)))
        .await
        .unwrap();

    market.clock.advance(chrono::Duration::seconds(1));

    let taken = market
        .place_order(order(&product, Uuid::new_v4(), Side::Buy, dec!(10), dec!(5)))
        .await
        .unwrap();
    assert_eq!(taken.trades.len(), 1);

    let received = tokio::time::timeout(Duration::from_secs(1), notifications.recv())
        .await
        .expect("notification should arrive")
        .unwrap();

    assert_eq!(received.trade.id, taken.trades[0].id);
    assert_eq!(received.product_name, "Crude Oil");
    assert_eq!(received.buyer_id, taken.trades[0].buyer_id);
    assert_eq!(received.seller_id, taken.trades[0].seller_id);
}

#[tokio::test]
async fn remainder_rests_and_matches_later_submissions() {
    let (market, product) = marketplace().await;
    let buyer = Uuid::new_v4();

    let taken = market
        .place_order(order(&product, buyer, Side::Buy, dec!(10), dec!(30)))
        .await
        .unwrap();
    assert_eq!(taken.remaining, Volume::from(dec!(30)));

    market.clock.advance(chrono::Duration::seconds(1));

    // A later sell crosses the resting remainder.
    let sold = market
        .place_order(order(&product, Uuid::new_v4(), Side::Sell, dec!(10), dec!(30)))
        .await
        .unwrap();

    assert_eq!(sold.trades.len(), 1);
    assert_eq!(sold.trades[0].buyer_id, buyer);

    let original = market.order(taken.order.id).await.unwrap().unwrap();
    assert_eq!(original.status, OrderStatus::Filled);
}
