use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

use super::{EmailJob, MailError, Mailer};

/// Amazon SES v2 mailer
#[derive(Debug, Clone)]
pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub fn new(client: SesClient, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }

    /// Build a client from the default AWS credential chain
    ///
    /// `SES_REGION` overrides the region when set.
    pub async fn from_env(from: impl Into<String>) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = match std::env::var("SES_REGION") {
            Ok(region) => {
                let ses_config = aws_config
                    .to_builder()
                    .region(aws_config::Region::new(region))
                    .build();
                SesClient::new(&ses_config)
            }
            Err(_) => SesClient::new(&aws_config),
        };
        Self::new(client, from)
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, job: &EmailJob) -> Result<(), MailError> {
        let subject = Content::builder()
            .data(job.subject())
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Build(e.to_string()))?;

        let text = Content::builder()
            .data(job.body())
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Build(e.to_string()))?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().text(text).build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(job.recipient()).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        tracing::info!(to = job.recipient(), kind = job.kind(), "Email sent via SES");
        Ok(())
    }
}
