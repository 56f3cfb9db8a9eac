use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    api::{LoginFlow, PendingLogin},
    server,
};

pub async fn serve() {
    let pending: PendingLogin = Arc::new(Mutex::new(LoginFlow::default()));
    server::start_api_server(pending).await;
}
