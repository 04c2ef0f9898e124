use actix_web::get;
use actix_web::web::{Data, ServiceConfig};

use crate::DatabaseManager;
use crate::controllers;
use crate::metrics::AppMetrics;

/// Register application data and routes.
pub fn route(app: &mut ServiceConfig, manager: DatabaseManager, metrics: AppMetrics) {
    app.app_data(Data::new(manager));
    app.app_data(Data::new(metrics));
    app.service(index);
    // Reports
    app.service(controllers::reports::customer_count);
    app.service(controllers::reports::customer_names);
    app.service(controllers::reports::pending_orders);
    // Health check endpoints
    app.service(controllers::health::health);
    app.service(controllers::health::ready);
    // Metrics endpoint
    app.service(controllers::metrics::metrics);
}

#[get("/")]
pub async fn index() -> &'static str {
    "poolguard"
}
