//! Outgoing email
//!
//! Handlers never talk to a mail provider. They push an [`EmailJob`] onto the
//! [`EmailQueue`] and return; a single worker task drains the queue and hands
//! each job to a [`Mailer`]. Delivery is fire-and-forget: failures are logged
//! and the job is dropped.

mod ses;

pub use ses::SesMailer;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Queue capacity used by the server
pub const QUEUE_CAPACITY: usize = 256;

/// An email waiting to be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailJob {
    /// Account activation link
    Verification { to: String, link: String },
    /// Password reset link
    PasswordReset { to: String, link: String },
    /// Reservation receipt
    ReservationConfirmed {
        to: String,
        date: NaiveDate,
        time: NaiveTime,
        people: i32,
    },
}

impl EmailJob {
    pub fn recipient(&self) -> &str {
        match self {
            Self::Verification { to, .. }
            | Self::PasswordReset { to, .. }
            | Self::ReservationConfirmed { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Verification { .. } => "verification",
            Self::PasswordReset { .. } => "password_reset",
            Self::ReservationConfirmed { .. } => "reservation_confirmed",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Self::Verification { .. } => "تأیید حساب کاربری",
            Self::PasswordReset { .. } => "بازیابی رمز عبور",
            Self::ReservationConfirmed { .. } => "تأیید رزرو میز",
        }
    }

    /// Plain-text body
    pub fn body(&self) -> String {
        match self {
            Self::Verification { link, .. } => format!(
                "برای فعال‌سازی حساب کاربری خود روی لینک زیر کلیک کنید:\n{link}\n\n\
                 اگر شما ثبت‌نام نکرده‌اید، این ایمیل را نادیده بگیرید."
            ),
            Self::PasswordReset { link, .. } => format!(
                "برای تعیین رمز عبور جدید روی لینک زیر کلیک کنید:\n{link}\n\n\
                 اگر شما این درخواست را نداده‌اید، این ایمیل را نادیده بگیرید."
            ),
            Self::ReservationConfirmed {
                date, time, people, ..
            } => format!(
                "رزرو شما با موفقیت ثبت شد.\n\
                 تاریخ: {date}\n\
                 ساعت: {}\n\
                 تعداد نفرات: {people}",
                time.format("%H:%M")
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to build message: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivers one email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, job: &EmailJob) -> Result<(), MailError>;
}

/// Writes emails to the log instead of sending them
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, job: &EmailJob) -> Result<(), MailError> {
        tracing::info!(
            to = job.recipient(),
            kind = job.kind(),
            subject = job.subject(),
            body = %job.body(),
            "Email (log backend)"
        );
        Ok(())
    }
}

/// Sending half of the email queue
#[derive(Debug, Clone)]
pub struct EmailQueue {
    tx: mpsc::Sender<EmailJob>,
}

impl EmailQueue {
    /// Create a bounded queue; the receiver goes to [`spawn_worker`]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<EmailJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue without waiting
    ///
    /// Returns `false` when the job was dropped because the queue is full or
    /// the worker is gone.
    pub fn enqueue(&self, job: EmailJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::error!(to = job.recipient(), kind = job.kind(), "Email queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::error!(to = job.recipient(), kind = job.kind(), "Email worker stopped, dropping job");
                false
            }
        }
    }
}

/// Drain `rx` until every sender is dropped
pub fn spawn_worker(mut rx: mpsc::Receiver<EmailJob>, mailer: Arc<dyn Mailer>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match mailer.send(&job).await {
                Ok(()) => tracing::debug!(to = job.recipient(), kind = job.kind(), "Email sent"),
                Err(e) => tracing::error!(
                    to = job.recipient(),
                    kind = job.kind(),
                    error = %e,
                    "Email delivery failed"
                ),
            }
        }
        tracing::info!("Email worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailJob>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, job: &EmailJob) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Delivery("smtp down".into()));
            }
            self.sent.lock().await.push(job.clone());
            Ok(())
        }
    }

    fn verification(to: &str) -> EmailJob {
        EmailJob::Verification {
            to: to.to_string(),
            link: "http://localhost:8000/accounts/api/V1/is-verified/t/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_worker_delivers_in_order() {
        let (queue, rx) = EmailQueue::new(8);
        let mailer = Arc::new(RecordingMailer::default());
        let handle = spawn_worker(rx, mailer.clone());

        assert!(queue.enqueue(verification("a@example.com")));
        assert!(queue.enqueue(verification("b@example.com")));
        drop(queue);
        handle.await.unwrap();

        let sent = mailer.sent.lock().await;
        let recipients: Vec<&str> = sent.iter().map(|j| j.recipient()).collect();
        assert_eq!(recipients, vec!["a@example.com", "b@example.com"]);
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_worker_alive() {
        let (queue, rx) = EmailQueue::new(8);
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let handle = spawn_worker(rx, mailer);
        assert!(queue.enqueue(verification("a@example.com")));
        assert!(queue.enqueue(verification("b@example.com")));
        drop(queue);
        handle.await.unwrap();
    }

    #[test]
    fn test_full_queue_drops_job() {
        let (queue, _rx) = EmailQueue::new(1);
        assert!(queue.enqueue(verification("a@example.com")));
        assert!(!queue.enqueue(verification("b@example.com")));
    }

    #[test]
    fn test_closed_queue_drops_job() {
        let (queue, rx) = EmailQueue::new(1);
        drop(rx);
        assert!(!queue.enqueue(verification("a@example.com")));
    }

    #[test]
    fn test_reservation_body() {
        let job = EmailJob::ReservationConfirmed {
            to: "user@example.com".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            people: 2,
        };
        let body = job.body();
        assert!(body.contains("2030-01-02"));
        assert!(body.contains("14:00"));
        assert_eq!(job.recipient(), "user@example.com");
    }
}
