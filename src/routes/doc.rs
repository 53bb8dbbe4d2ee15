use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartLineView,
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartView, UpdateCartRequest},
        orders::{CheckoutReceipt, OrderList, OrderWithItems},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList},
        stores::{CreateStoreRequest, StoreList, UpdateStoreRequest},
    },
    models::{Order, OrderItem, OrderStatus, Product, Review, Store, StoreCategory, User, UserRole},
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, health, orders, params, products as product_routes, reviews, stores,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        stores::list_stores,
        stores::create_store,
        stores::get_store,
        stores::update_store,
        stores::delete_store,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::checkout_summary,
        cart::checkout,
        orders::list_orders,
        orders::get_order,
        orders::cancel_order,
        reviews::list_reviews,
        reviews::create_review,
        reviews::get_review
    ),
    components(
        schemas(
            User,
            UserRole,
            Store,
            StoreCategory,
            Product,
            Order,
            OrderStatus,
            OrderItem,
            Review,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateStoreRequest,
            UpdateStoreRequest,
            StoreList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddToCartRequest,
            UpdateCartRequest,
            CartLineView,
            CartView,
            CheckoutReceipt,
            OrderList,
            OrderWithItems,
            CreateReviewRequest,
            ReviewList,
            health::HealthData,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            params::ProductQuery,
            params::StoreQuery,
            params::OrderListQuery,
            params::ReviewQuery,
            Meta,
            ApiResponse<Store>,
            ApiResponse<StoreList>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutReceipt>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Review>,
            ApiResponse<ReviewList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Stores", description = "Vendor stores"),
        (name = "Products", description = "Product catalog"),
        (name = "Cart", description = "Session cart and checkout"),
        (name = "Orders", description = "Order history"),
        (name = "Reviews", description = "Product reviews"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
