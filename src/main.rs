mod carousel_app;
mod dom;
mod media;
mod overlay;
mod registry;
mod renderer;
mod settings;

fn main() {
    console_error_panic_hook::set_once();
    carousel_app::run();
}
