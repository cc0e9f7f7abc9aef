use std::thread;

use chrono::{DateTime, Local};
use concat_string::concat_string;
use once_cell::sync::Lazy;
use strum::{AsRefStr, Display};
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedSender},
    oneshot,
};

use crate::logging::rotate::Rotate;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 日誌等級
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, AsRefStr)]
pub enum Level {
    #[strum(serialize = "Debug")]
    Debug,
    #[strum(serialize = "Info")]
    Info,
    #[strum(serialize = "Warn")]
    Warn,
    #[strum(serialize = "Error")]
    Error,
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }

    fn line(&self) -> String {
        concat_string!(
            self.created_at.format("%F %X%.6f").to_string(),
            " ",
            self.level.as_ref(),
            " ",
            self.msg,
            "\r\n"
        )
    }
}

enum Command {
    Write(LogMessage),
    /// 寫出暫存的內容後回覆
    Flush(oneshot::Sender<()>),
}

/// 以背景執行緒寫檔的 logger，每個名稱各自一組輪轉檔案 `log/%Y-%m-%d-{name}.log`
pub struct Logger {
    writer: UnboundedSender<Command>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        let (tx, mut rx) = unbounded_channel::<Command>();
        let pattern = format!("log/%Y-%m-%d-{}.log", log_name);

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut rotate = Rotate::new(pattern);
            let mut together = String::with_capacity(4096);
            let mut last_at = Local::now();

            while let Some(command) = rx.blocking_recv() {
                match command {
                    Command::Write(received) => {
                        last_at = received.created_at;
                        together.push_str(&received.line());

                        if rx.is_empty() || together.len() >= 4096 {
                            write_batch(&mut rotate, last_at, &mut together);
                        }
                    }
                    Command::Flush(done) => {
                        write_batch(&mut rotate, last_at, &mut together);
                        rotate.flush();
                        let _ = done.send(());
                    }
                }
            }

            write_batch(&mut rotate, last_at, &mut together);
            rotate.flush();
        });

        Logger { writer: tx }
    }

    /// 等待在此之前送出的訊息都寫入檔案
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.writer.send(Command::Flush(tx)).is_err() {
            return;
        }

        if let Err(why) = rx.await {
            error_console(format!("Failed to flush log because {:?}", why));
        }
    }

    pub fn info<S: Into<String>>(&self, log: S) {
        self.send(Level::Info, log.into());
    }

    pub fn warn<S: Into<String>>(&self, log: S) {
        self.send(Level::Warn, log.into());
    }

    pub fn error<S: Into<String>>(&self, log: S) {
        self.send(Level::Error, log.into());
    }

    pub fn debug<S: Into<String>>(&self, log: S) {
        self.send(Level::Debug, log.into());
    }

    fn send(&self, level: Level, msg: String) {
        if self
            .writer
            .send(Command::Write(LogMessage::new(level, msg)))
            .is_err()
        {
            error_console("Log writer is closed");
        }
    }
}

fn write_batch(rotate: &mut Rotate, now: DateTime<Local>, together: &mut String) {
    if together.is_empty() {
        return;
    }

    if let Err(why) = rotate.write_msg(now, together.as_bytes()) {
        error_console(format!("Failed to write log because {:?}", why));
        info_console(together.as_str());
    }

    together.clear();
}

pub fn info_file_async<S: Into<String>>(log: S) {
    LOGGER.info(log);
}

pub fn warn_file_async<S: Into<String>>(log: S) {
    LOGGER.warn(log);
}

pub fn error_file_async<S: Into<String>>(log: S) {
    LOGGER.error(log);
}

pub fn debug_file_async<S: Into<String>>(log: S) {
    LOGGER.debug(log);
}

/// 等待預設 logger 寫完
pub async fn flush_file_async() {
    LOGGER.flush().await;
}

pub fn info_console<S: AsRef<str>>(log: S) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log.as_ref()
    );
}

pub fn error_console<S: AsRef<str>>(log: S) {
    eprintln!(
        "{} Error {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log.as_ref()
    );
}
