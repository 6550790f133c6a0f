mod common;

use axum::http::StatusCode;
use common::{assert_redirect, json, location, money, session_cookie, TestApp};
use rust_decimal::Decimal;

fn titles(page: &serde_json::Value) -> Vec<String> {
    page["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

//=========================================================================================
// Catalog
//=========================================================================================

#[tokio::test]
async fn catalog_lists_cheapest_first_and_filters() {
    let app = TestApp::new();
    let fiction = app.category("Fiction").await;
    let science = app.category("Science").await;
    app.book(Some(&fiction), "Dune", "12.50").await;
    app.book(Some(&science), "Cosmos", "9.99").await;
    app.book(None, "Dune Messiah", "11.00").await;

    let page = json(app.get("/", None).await).await;
    assert_eq!(titles(&page), vec!["Cosmos", "Dune Messiah", "Dune"]);
    assert_eq!(page["cat"], "all");
    assert_eq!(page["cart_count"], 0);
    assert_eq!(page["signed_in"], false);
    let categories: Vec<_> = page["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Fiction", "Science"]);

    let by_category = json(app.get(&format!("/?cat={}", fiction.id), None).await).await;
    assert_eq!(titles(&by_category), vec!["Dune"]);
    assert_eq!(by_category["cat"], fiction.id.to_string());

    let searched = json(app.get("/?q=dUNE", None).await).await;
    assert_eq!(titles(&searched), vec!["Dune Messiah", "Dune"]);
    assert_eq!(searched["query"], "dUNE");

    let both = json(app.get(&format!("/?q=dune&cat={}", fiction.id), None).await).await;
    assert_eq!(titles(&both), vec!["Dune"]);
}

#[tokio::test]
async fn unusable_category_parameters_list_everything() {
    let app = TestApp::new();
    app.book(None, "Dune", "12.50").await;
    app.book(None, "Cosmos", "9.99").await;

    for uri in ["/?cat=all", "/?cat=", "/?cat=fiction", "/?q=++"] {
        let page = json(app.get(uri, None).await).await;
        assert_eq!(titles(&page).len(), 2, "{}", uri);
        assert_eq!(page["cat"], "all", "{}", uri);
    }
}

//=========================================================================================
// Cart
//=========================================================================================

#[tokio::test]
async fn cart_changes_persist_through_the_session_cookie() {
    let app = TestApp::new();
    let dune = app.book(None, "Dune", "12.50").await;
    let cosmos = app.book(None, "Cosmos", "9.99").await;

    let response = app.get(&format!("/cart/add/{}/", dune.id), None).await;
    assert_redirect(&response, "/cart/");
    let cookie = session_cookie(&response).unwrap();
    let cookie = Some(cookie.as_str());

    app.get(&format!("/cart/add/{}/", dune.id), cookie).await;
    app.get(&format!("/cart/add/{}/", cosmos.id), cookie).await;

    let cart = json(app.get("/cart/", cookie).await).await;
    assert_eq!(cart["cart_count"], 3);
    assert_eq!(cart["items"][0]["book"]["title"], "Dune");
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(money(&cart["items"][0]["line_total"]), Decimal::new(2500, 2));
    assert_eq!(cart["items"][1]["book"]["title"], "Cosmos");
    assert_eq!(money(&cart["subtotal"]), Decimal::new(3499, 2));

    app.get(&format!("/cart/decrease/{}/", dune.id), cookie).await;
    app.get(&format!("/cart/remove/{}/", cosmos.id), cookie).await;
    let cart = json(app.get("/cart/", cookie).await).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 1);
    assert_eq!(money(&cart["subtotal"]), Decimal::new(1250, 2));

    let home = json(app.get("/", cookie).await).await;
    assert_eq!(home["cart_count"], 1);
}

#[tokio::test]
async fn add_then_decrease_leaves_an_empty_cart() {
    let app = TestApp::new();
    let dune = app.book(None, "Dune", "12.50").await;

    let response = app.get(&format!("/cart/add/{}/", dune.id), None).await;
    let cookie = session_cookie(&response).unwrap();
    let response = app
        .get(&format!("/cart/decrease/{}/", dune.id), Some(&cookie))
        .await;
    assert_redirect(&response, "/cart/");

    let cart = json(app.get("/cart/", Some(&cookie)).await).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(cart["cart_count"], 0);

    // Decreasing or removing something absent is not an error.
    let response = app.get("/cart/decrease/999/", Some(&cookie)).await;
    assert_redirect(&response, "/cart/");
    let response = app.get("/cart/remove/999/", Some(&cookie)).await;
    assert_redirect(&response, "/cart/");
}

#[tokio::test]
async fn deleted_books_drop_out_of_the_cart() {
    let app = TestApp::new();
    let dune = app.book(None, "Dune", "12.50").await;

    let response = app.get(&format!("/cart/add/{}/", dune.id), None).await;
    let cookie = session_cookie(&response).unwrap();
    app.store.delete_book(dune.id).unwrap();

    let cart = json(app.get("/cart/", Some(&cookie)).await).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(money(&cart["subtotal"]), Decimal::ZERO);

    let response = app.get("/checkout/", Some(&cookie)).await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn unknown_session_cookies_start_a_fresh_cart() {
    let app = TestApp::new();
    let cart = json(app.get("/cart/", Some("sessionid=does-not-exist")).await).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

//=========================================================================================
// Checkout
//=========================================================================================

async fn cart_with(app: &TestApp, book_ids: &[i64]) -> String {
    let mut cookie: Option<String> = None;
    for id in book_ids {
        let response = app.get(&format!("/cart/add/{}/", id), cookie.as_deref()).await;
        cookie = session_cookie(&response);
    }
    cookie.unwrap()
}

#[tokio::test]
async fn checkout_places_one_order_and_empties_the_cart() {
    let app = TestApp::with_shipping_fee(Decimal::new(500, 2));
    let dune = app.book(None, "Dune", "12.50").await;
    let cosmos = app.book(None, "Cosmos", "9.99").await;
    let cookie = cart_with(&app, &[dune.id, dune.id, cosmos.id]).await;

    let page = json(app.get("/checkout/", Some(&cookie)).await).await;
    assert_eq!(money(&page["subtotal"]), Decimal::new(3499, 2));
    assert_eq!(money(&page["shipping_fee"]), Decimal::new(500, 2));
    assert_eq!(money(&page["total"]), Decimal::new(3999, 2));
    assert_eq!(page["form"]["payment_method"], "COD");
    assert!(page["error"].is_null());

    let response = app
        .post_form(
            "/checkout/",
            "full_name=+Ada+Lovelace+&phone=555-0100&address=1+Analytical+Row&city=&payment_method=CARD",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).unwrap();
    assert!(target.starts_with("/order/success/"));
    assert_eq!(app.store.order_count().unwrap(), 1);

    let order = json(app.get(&target, Some(&cookie)).await).await;
    assert_eq!(order["full_name"], "Ada Lovelace");
    assert_eq!(order["city"], "");
    assert_eq!(order["payment_method"], "CARD");
    assert_eq!(money(&order["total"]), Decimal::new(3999, 2));
    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["book_id"], dune.id);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(money(&items[0]["price"]), Decimal::new(1250, 2));

    let cart = json(app.get("/cart/", Some(&cookie)).await).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_payment_methods_fall_back_to_cash_on_delivery() {
    let app = TestApp::new();
    let dune = app.book(None, "Dune", "12.50").await;
    let cookie = cart_with(&app, &[dune.id]).await;

    let response = app
        .post_form(
            "/checkout/",
            "full_name=Ada&phone=1&address=Row&payment_method=BITCOIN",
            Some(&cookie),
        )
        .await;
    let order = json(app.get(&location(&response).unwrap(), None).await).await;
    assert_eq!(order["payment_method"], "COD");
    assert_eq!(order["payment_method_label"], "Cash on Delivery");
}

#[tokio::test]
async fn blank_required_fields_are_rejected_without_an_order() {
    let app = TestApp::new();
    let dune = app.book(None, "Dune", "12.50").await;
    let cookie = cart_with(&app, &[dune.id]).await;

    let response = app
        .post_form(
            "/checkout/",
            "full_name=+++&phone=555&address=Row&city=Paris&payment_method=CARD",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json(response).await;
    assert_eq!(page["error"], "Please fill in: full name, phone, address.");
    assert_eq!(page["form"]["full_name"], "");
    assert_eq!(page["form"]["phone"], "555");
    assert_eq!(page["form"]["city"], "Paris");
    assert_eq!(page["form"]["payment_method"], "CARD");
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(app.store.order_count().unwrap(), 0);

    let cart = json(app.get("/cart/", Some(&cookie)).await).await;
    assert_eq!(cart["cart_count"], 1);
}

#[tokio::test]
async fn checkout_with_an_empty_cart_redirects_home() {
    let app = TestApp::new();

    assert_redirect(&app.get("/checkout/", None).await, "/");
    let response = app
        .post_form("/checkout/", "full_name=Ada&phone=1&address=Row", None)
        .await;
    assert_redirect(&response, "/");
    assert_eq!(app.store.order_count().unwrap(), 0);
}

#[tokio::test]
async fn unknown_orders_are_not_found() {
    let app = TestApp::new();
    let response = app.get("/order/success/999/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
