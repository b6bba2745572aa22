use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match s3rpent_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("S3rpent exited with error: {e}");
            eprintln!("s3rpent: {e}");
            ExitCode::FAILURE
        }
    }
}
