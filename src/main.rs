use dotenv::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();
    salon_backend::run().await;
}
