//! Headless host demo
//!
//! Drives the swapchain lifecycle adapter the way a real frontend would:
//! one simulated window-system thread publishing geometry changes and
//! eventually tearing the window down, one render loop polling, resizing
//! and swapping. Uses the headless presenter, so it runs without a GPU.

use std::error::Error;
use std::thread;
use std::time::Duration;

use surface_sync::config::Config;
use surface_sync::prelude::*;

const CONFIG_PATH: &str = "host_app.toml";
const FRAME_TIME: Duration = Duration::from_millis(4);

fn load_config() -> DriverConfig {
    match DriverConfig::load_from_file(CONFIG_PATH) {
        Ok(config) => {
            log::info!("Loaded driver config from {}.", CONFIG_PATH);
            config
        }
        Err(_) => DriverConfig::default(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let shared = SharedWindowState::with_content_rect(800, 600);
    shared.attach_window(NativeWindow::Headless);

    // Window-system thread: report a resize mid-run, destroy the window at
    // the end.
    let window_side = shared.clone();
    let window_thread = thread::spawn(move || {
        thread::sleep(Duration::from_millis(120));
        log::info!("window system: content rect -> 1280x720");
        window_side.publish_content_rect(1280, 720);

        thread::sleep(Duration::from_millis(120));
        log::info!("window system: destroying window");
        window_side.detach_window();
    });

    let config = load_config();
    let driver = VulkanContextDriver::new(shared.clone(), HeadlessPresenter::new(), &config)?;

    let mut registry = DriverRegistry::new();
    let id = registry.register(Box::new(driver));
    let driver = registry.get_mut(id).ok_or("driver vanished from registry")?;
    log::info!("adapter capabilities: {:?}", driver.capabilities());

    driver.set_video_mode(800, 600, false)?;
    driver.set_swap_interval(1);

    let (mut width, mut height) = driver.video_size();
    for frame in 0..60 {
        let check = driver.check_window(width, height);
        if check.quit {
            break;
        }
        if check.resize {
            width = check.width;
            height = check.height;
            if let Err(err) = driver.set_resize(width, height) {
                log::warn!("resize failed, retrying next frame: {}", err);
            }
        }
        if driver.swapchain_invalidated() {
            log::info!("frame {}: rebuilding cached swapchain resources", frame);
        }

        driver.swap_buffers();
        thread::sleep(FRAME_TIME);
    }

    registry.destroy(id);
    window_thread.join().map_err(|_| "window thread panicked")?;
    log::info!("clean shutdown");
    Ok(())
}
