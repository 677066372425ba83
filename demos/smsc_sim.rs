// ABOUTME: Standalone SMSC simulator - listens for ESME binds and answers with the defaults

use argh::FromArgs;
use smpp_sim::Smsc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(FromArgs)]
/// In-process SMSC simulator.
struct Args {
    /// address to listen on
    #[argh(option, default = "String::from(\"127.0.0.1:2775\")")]
    listen: String,

    /// system_id clients must bind with
    #[argh(option, default = "String::from(\"SystemId\")")]
    system_id: String,

    /// password clients must bind with
    #[argh(option, default = "String::from(\"Password\")")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args: Args = argh::from_env();

    let listener = TcpListener::bind(&args.listen).await?;
    tracing::info!(addr = %listener.local_addr()?, "SMSC listening");

    let smsc = Smsc::new(listener, args.system_id, args.password);
    smsc.start().await;

    loop {
        tokio::time::sleep(Duration::from_secs(30)).await;
        tracing::info!(connections = smsc.number_of_connections(), "still serving");
    }
}
