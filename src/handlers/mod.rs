pub mod auth;
pub mod clients;
pub mod common;
pub mod credit;
pub mod health;
pub mod menu_categories;
pub mod menu_items;
pub mod orders;
pub mod tables;
pub mod variations;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::catalog::CatalogService;
use crate::services::clients::ClientService;
use crate::services::credit::CreditService;
use crate::services::orders::OrderService;
use crate::supabase::SupabaseClient;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub clients: Arc<ClientService>,
    pub credit: Arc<CreditService>,
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    pub fn new(supabase: Arc<SupabaseClient>, config: &AppConfig) -> Self {
        let clients = Arc::new(ClientService::new(supabase.clone()));
        let credit = Arc::new(CreditService::new(supabase.clone(), clients.clone()));
        let catalog = Arc::new(CatalogService::new(
            supabase.clone(),
            config.allow_cross_user_operations,
            config.fallback_username.clone(),
        ));
        let orders = Arc::new(OrderService::new(supabase));

        Self {
            clients,
            credit,
            catalog,
            orders,
        }
    }
}
