use std::env;

use blobsign_azure_blob::{BlobWrite, Client, Error};
use blobsign_core::{Context, OsEnv};
use blobsign_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = env_logger::builder().try_init();

    // Falls back to the local emulator (Azurite) when no connection string is set.
    let conn_str = env::var("AZURE_STORAGE_CONNECTION_STRING")
        .unwrap_or_else(|_| "UseDevelopmentStorage=true".to_string());
    let container = env::var("AZURE_STORAGE_CONTAINER").unwrap_or_else(|_| "demo".to_string());

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let client = Client::from_connection_string(ctx, &conn_str)?;
    println!("Using endpoint {}", client.config().endpoint_url());

    // Example 1: create the container, an existing one answers 409.
    match client.create_container(&container).await {
        Ok(()) => println!("Container {container} created"),
        Err(err) if err.status() == Some(http::StatusCode::CONFLICT) => {
            println!("Container {container} already exists")
        }
        Err(err) => return Err(err),
    }

    // Example 2: write and read back a block blob.
    let path = format!("/{container}/hello.txt");
    client
        .put_blob(&path, BlobWrite::Block(Bytes::from("Hello, World!")))
        .await?;
    let body = client.get_blob(&path).await?;
    println!("Read {path}: {}", String::from_utf8_lossy(&body));

    // Example 3: append blobs grow one block at a time.
    let log_path = format!("/{container}/events.log");
    client
        .put_blob(&log_path, BlobWrite::Append(Bytes::from("started\n")))
        .await?;
    client
        .append_block(&log_path, Bytes::from("finished\n"))
        .await?;

    // Example 4: list everything in the container.
    for name in client.list_blobs(&format!("/{container}")).await? {
        println!("Found blob: {name}");
    }

    // Example 5: a read-only link valid for one hour.
    let link = client.signed_link(&path, None)?;
    println!("Shareable link: {link}");

    client.delete_blob(&log_path).await?;
    client.delete_blob(&path).await?;

    Ok(())
}
