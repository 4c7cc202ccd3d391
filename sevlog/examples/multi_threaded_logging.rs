use sevlog::{SeverityMask, logger_config};

fn main() {
    let _guard = logger_config()
        .with_mask(SeverityMask::ALL)
        .with_timestamp(true)
        .with_thread_id(true)
        .init_global()
        .expect("logger init failed");

    log::info!("Hello, world from the main thread!");

    let handles: Vec<_> = (0..5)
        .map(|i| {
            std::thread::spawn(move || {
                log::warn!("Hello, world from thread {i}!");
                log::debug!("thread {i} details:\nstep one done\r\nstep two done");
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    log::error!("done; every line above carries its own decoration");
    // guard flushes and shuts the logger down
}
