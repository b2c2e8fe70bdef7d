// Wayland integration module
// Handles all Wayland-specific functionality using smithay-client-toolkit

use crate::app::{BounceWindow, Event, Key, Response};
use crate::dialogs::NativeDialogs;
use crate::physics::{Bounds, Vec2};
use crate::wgpu_renderer::WgpuRenderer;
use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbaImage};
use log::{debug, error, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_layer, delegate_output, delegate_pointer,
    delegate_registry, delegate_seat, delegate_shm,
    output::{OutputHandler, OutputState},
    reexports::{
        calloop::{
            timer::{TimeoutAction, Timer},
            EventLoop,
        },
        calloop_wayland_source::WaylandSource,
    },
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers},
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{
        slot::{Buffer, SlotPool},
        Shm, ShmHandler,
    },
};
use std::time::{Duration, Instant};
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_shm, wl_surface},
    Connection, Proxy, QueueHandle,
};

/// Mouse button constants
const BTN_LEFT: u32 = 272;

/// Used until an output has reported its geometry
const FALLBACK_BOUNDS: Bounds = Bounds {
    x: 0.0,
    y: 0.0,
    width: 1920.0,
    height: 1080.0,
};

/// Main Wayland application state
struct WaylandApp {
    // Registry state
    registry_state: RegistryState,
    // Seat state for input handling
    seat_state: SeatState,
    // Output state for display info
    output_state: OutputState,
    // Output the window lives on; bounds are measured against it
    current_output: Option<wl_output::WlOutput>,
    // Shared memory for buffer allocation
    shm: Shm,
    // Layer shell for overlay windows
    layer_shell: LayerShell,
    // Compositor state
    compositor_state: CompositorState,

    // Wayland display pointer (for GPU rendering)
    display_ptr: *mut std::ffi::c_void,

    // Application-specific state
    window: BounceWindow,
    dialogs: NativeDialogs,
    should_exit: bool,

    // Surface and buffer management
    layer_surface: Option<LayerSurface>,
    pool: Option<SlotPool>,
    buffer: Option<Buffer>,
    configured: bool,

    // Last surface-local pointer position
    pointer_pos: (f64, f64),
    // Keyboard is held exclusively while the window fades in
    keyboard_grabbed: bool,

    // GPU rendering
    use_gpu: bool,
    gpu_renderer: Option<WgpuRenderer>,
    gpu_initialized: bool,
}

impl WaylandApp {
    /// Feed an event to the window and carry out whatever it asks for
    fn dispatch(&mut self, event: Event) {
        let response = self.window.update(event, &mut self.dialogs);
        self.apply(response);
    }

    fn apply(&mut self, response: Response) {
        if response.exit {
            self.should_exit = true;
            return;
        }
        if response.moved {
            self.update_position();
        }
        if response.redraw || response.surfaces_changed {
            self.draw();
        }
    }

    /// Pointer position in screen coordinates
    fn cursor_on_screen(&self) -> Vec2 {
        let (x, y) = self.window.location();
        Vec2::new(
            x as f32 + self.pointer_pos.0 as f32,
            y as f32 + self.pointer_pos.1 as f32,
        )
    }

    fn pointer_offset(&self) -> Vec2 {
        Vec2::new(self.pointer_pos.0 as f32, self.pointer_pos.1 as f32)
    }

    /// Re-query the usable display area of the window's output
    fn refresh_bounds(&mut self) {
        let bounds = display_bounds(&self.output_state, self.current_output.as_ref());
        self.dispatch(Event::DisplayChanged(bounds));
    }

    fn is_current_output(&self, output: &wl_output::WlOutput) -> bool {
        self.current_output.as_ref() == Some(output)
    }

    /// Hand keyboard focus back to the compositor once the launch fade is over
    fn release_keyboard_grab(&mut self) {
        if !self.keyboard_grabbed || self.window.is_launching() {
            return;
        }
        if let Some(ref layer_surface) = self.layer_surface {
            debug!("Launch finished, keyboard focus now on demand");
            layer_surface.set_keyboard_interactivity(KeyboardInteractivity::OnDemand);
            layer_surface.commit();
        }
        self.keyboard_grabbed = false;
    }

    /// Update window position using layer shell margins
    fn update_position(&mut self) {
        if let Some(ref layer_surface) = self.layer_surface {
            let (x, y) = self.window.location();
            layer_surface.set_anchor(Anchor::TOP | Anchor::LEFT);
            layer_surface.set_margin(y.max(0), 0, 0, x.max(0));
            layer_surface.commit();
        }
    }

    /// Initialize GPU renderer from Wayland surface
    fn init_gpu_renderer(&mut self) {
        if self.gpu_initialized {
            return;
        }

        let layer_surface = match &self.layer_surface {
            Some(ls) => ls,
            None => {
                warn!("Cannot init GPU: no layer surface");
                return;
            }
        };

        // With wayland-backend's client_system feature, ObjectId.as_ptr() is the raw wl_surface
        let wl_surface = layer_surface.wl_surface();
        let surface_ptr = wl_surface.id().as_ptr() as *mut std::ffi::c_void;
        let display_ptr = self.display_ptr;

        if display_ptr.is_null() {
            warn!("Display pointer is null, falling back to CPU rendering");
            self.use_gpu = false;
            return;
        }

        let (width, height) = self.window.size();
        match WgpuRenderer::new(display_ptr, surface_ptr, width, height) {
            Ok(renderer) => {
                self.gpu_renderer = Some(renderer);
                self.gpu_initialized = true;
                info!("GPU renderer initialized successfully");
            }
            Err(e) => {
                warn!("Failed to initialize GPU renderer: {:?}", e);
                warn!("Falling back to CPU rendering");
                self.use_gpu = false;
            }
        }
    }

    /// Paint the current background surface
    fn draw(&mut self) {
        if !self.configured || self.layer_surface.is_none() {
            return;
        }

        // Once wgpu owns the surface, shm buffers must not be attached to it
        if self.use_gpu && self.gpu_renderer.is_some() {
            if !self.draw_gpu() {
                debug!("GPU frame skipped");
            }
            return;
        }

        self.draw_cpu();
    }

    /// Draw using GPU (wgpu)
    fn draw_gpu(&mut self) -> bool {
        let renderer = match self.gpu_renderer.as_mut() {
            Some(r) => r,
            None => return false,
        };

        let (width, height) = self.window.size();
        renderer.resize(width, height);
        renderer.sync_backgrounds(self.window.backgrounds());

        match renderer.render(self.window.tint(), self.window.opacity() as f32) {
            Ok(true) => {
                if let Some(ref layer_surface) = self.layer_surface {
                    layer_surface.wl_surface().commit();
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!("GPU render error: {:?}", e);
                false
            }
        }
    }

    /// Draw using CPU (shared memory buffer)
    fn draw_cpu(&mut self) {
        let (width, height) = self.window.size();
        let stride = width as i32 * 4;
        let buffer_size = stride as usize * height as usize;

        if self.pool.is_none() {
            match SlotPool::new(buffer_size, &self.shm) {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => {
                    error!("Failed to create slot pool: {}. Buffer size: {} bytes", e, buffer_size);
                    return;
                }
            }
        }
        let Some(pool) = self.pool.as_mut() else {
            return;
        };

        let (buffer, canvas) = match pool.create_buffer(
            width as i32,
            height as i32,
            stride,
            wl_shm::Format::Argb8888,
        ) {
            Ok(buf) => buf,
            Err(e) => {
                error!("Failed to create buffer {}x{}: {}", width, height, e);
                return;
            }
        };

        let surface = self.window.backgrounds().surface(self.window.tint());
        blit_surface(surface, canvas, width, height, self.window.opacity() as f32);

        let Some(ref layer_surface) = self.layer_surface else {
            return;
        };
        let wl_surface = layer_surface.wl_surface();
        if let Err(e) = buffer.attach_to(wl_surface) {
            error!("Failed to attach buffer: {:?}", e);
            return;
        }
        wl_surface.damage_buffer(0, 0, width as i32, height as i32);
        wl_surface.commit();

        self.buffer = Some(buffer);
    }
}

/// Copy `surface` stretched (nearest neighbour) into an ARGB8888 canvas,
/// premultiplying every pixel by the window opacity
fn blit_surface(surface: &RgbaImage, canvas: &mut [u8], width: u32, height: u32, opacity: f32) {
    let (src_width, src_height) = surface.dimensions();
    if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
        return;
    }
    let src = surface.as_raw();
    let alpha_scale = (opacity.clamp(0.0, 1.0) * 255.0).round() as u32;

    // Pre-compute X lookup table to avoid repeated calculations per row
    let x_lut: Vec<usize> = (0..width as u64)
        .map(|x| (x * src_width as u64 / width as u64) as usize * 4)
        .collect();

    for (y, row) in canvas
        .chunks_exact_mut(width as usize * 4)
        .take(height as usize)
        .enumerate()
    {
        let src_y = (y as u64 * src_height as u64 / height as u64) as usize;
        let src_row = &src[src_y * src_width as usize * 4..(src_y + 1) * src_width as usize * 4];

        for (dst, &src_x) in row.chunks_exact_mut(4).zip(x_lut.iter()) {
            let px = &src_row[src_x..src_x + 4];
            let alpha = px[3] as u32 * alpha_scale / 255;
            // Little-endian ARGB8888 is B, G, R, A in memory
            dst[0] = (px[2] as u32 * alpha / 255) as u8;
            dst[1] = (px[1] as u32 * alpha / 255) as u8;
            dst[2] = (px[0] as u32 * alpha / 255) as u8;
            dst[3] = alpha as u8;
        }
    }
}

// Implement required traits for smithay-client-toolkit

impl CompositorHandler for WaylandApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        debug!("Scale factor changed");
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        output: &wl_output::WlOutput,
    ) {
        if self.is_current_output(output) {
            return;
        }
        debug!("Surface entered output {:?}", output.id());
        self.current_output = Some(output.clone());
        self.refresh_bounds();
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for WaylandApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("New output detected");
        // Before the window has an output any geometry beats the fallback
        if self.current_output.is_none() {
            self.refresh_bounds();
        }
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        if self.current_output.is_none() || self.is_current_output(&output) {
            debug!("Output updated");
            self.refresh_bounds();
        }
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        output: wl_output::WlOutput,
    ) {
        if self.is_current_output(&output) {
            debug!("Output under the window was removed");
            self.current_output = None;
            self.refresh_bounds();
        }
    }
}

impl LayerShellHandler for WaylandApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        info!("Layer surface closed by compositor");
        self.should_exit = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        debug!("Layer surface configured: {:?}", configure);
        self.configured = true;

        if self.use_gpu && !self.gpu_initialized {
            self.init_gpu_renderer();
        }

        self.draw();
    }
}

impl SeatHandler for WaylandApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("New seat");
    }

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        debug!("New capability: {:?}", capability);

        if capability == Capability::Keyboard {
            if let Err(e) = self.seat_state.get_keyboard(qh, &seat, None) {
                error!("Failed to get keyboard: {}", e);
            }
        }
        if capability == Capability::Pointer {
            if let Err(e) = self.seat_state.get_pointer(qh, &seat) {
                error!("Failed to get pointer: {}", e);
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        _capability: Capability,
    ) {
        debug!("Capability removed");
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("Seat removed");
    }
}

impl KeyboardHandler for WaylandApp {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        debug!("Keyboard entered surface");
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
        debug!("Keyboard left surface");
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        debug!("Key released: {:?}", event.keysym);
        self.dispatch(Event::KeyReleased(map_key(event.keysym)));
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {
    }
}

fn map_key(keysym: Keysym) -> Key {
    if keysym == Keysym::Escape {
        Key::Escape
    } else if keysym == Keysym::F6 {
        Key::ChooseBackground
    } else {
        Key::Other
    }
}

impl PointerHandler for WaylandApp {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            let now = Instant::now();
            match event.kind {
                PointerEventKind::Enter { .. } => {
                    debug!("Pointer entered");
                    self.pointer_pos = event.position;
                    self.dispatch(Event::PointerEntered);
                }
                PointerEventKind::Leave { .. } => {
                    debug!("Pointer left");
                    self.dispatch(Event::PointerLeft { at: now });
                }
                PointerEventKind::Motion { .. } => {
                    self.pointer_pos = event.position;
                    self.dispatch(Event::PointerMoved {
                        offset: self.pointer_offset(),
                        cursor: self.cursor_on_screen(),
                        at: now,
                    });
                }
                PointerEventKind::Press { button, .. } if button == BTN_LEFT => {
                    debug!("Left button pressed at {:?}", self.pointer_pos);
                    self.dispatch(Event::PointerPressed {
                        offset: self.pointer_offset(),
                        cursor: self.cursor_on_screen(),
                        at: now,
                    });
                }
                PointerEventKind::Release { button, .. } if button == BTN_LEFT => {
                    self.dispatch(Event::PointerReleased { at: now });
                }
                _ => {}
            }
        }
    }
}

impl ShmHandler for WaylandApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm
    }
}

impl ProvidesRegistryState for WaylandApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

// Delegate macros
delegate_compositor!(WaylandApp);
delegate_output!(WaylandApp);
delegate_layer!(WaylandApp);
delegate_seat!(WaylandApp);
delegate_keyboard!(WaylandApp);
delegate_pointer!(WaylandApp);
delegate_shm!(WaylandApp);
delegate_registry!(WaylandApp);

/// Run the Wayland application until the window has faded out
pub fn run(
    source: DynamicImage,
    width: u32,
    height: u32,
    tick: Duration,
    use_gpu: bool,
) -> Result<()> {
    info!("Connecting to Wayland display");

    let conn = Connection::connect_to_env().context("Failed to connect to Wayland display")?;

    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize registry")?;
    let qh = event_queue.handle();

    let compositor_state =
        CompositorState::bind(&globals, &qh).context("Failed to bind compositor")?;
    let layer_shell = LayerShell::bind(&globals, &qh).context("Failed to bind layer shell")?;
    let shm = Shm::bind(&globals, &qh).context("Failed to bind shm")?;

    // Get the display pointer for GPU rendering
    let display_ptr = conn.backend().display_ptr() as *mut std::ffi::c_void;

    let mut app = WaylandApp {
        registry_state: RegistryState::new(&globals),
        seat_state: SeatState::new(&globals, &qh),
        output_state: OutputState::new(&globals, &qh),
        current_output: None,
        shm,
        layer_shell,
        compositor_state,
        display_ptr,
        window: BounceWindow::new(&source, width, height, FALLBACK_BOUNDS),
        dialogs: NativeDialogs,
        should_exit: false,
        layer_surface: None,
        pool: None,
        buffer: None,
        configured: false,
        pointer_pos: (0.0, 0.0),
        keyboard_grabbed: true,
        use_gpu,
        gpu_renderer: None,
        gpu_initialized: false,
    };
    drop(source);

    // Dispatch once to get output info
    event_queue.roundtrip(&mut app)?;

    // Pin the surface to the output it is centred on
    app.current_output = first_measured_output(&app.output_state);
    let bounds = display_bounds(&app.output_state, app.current_output.as_ref());
    app.window.show(bounds);

    let surface = app.compositor_state.create_surface(&qh);
    let layer_surface = app.layer_shell.create_layer_surface(
        &qh,
        surface,
        Layer::Overlay,
        Some("rbounce"),
        app.current_output.as_ref(),
    );

    let (x, y) = app.window.location();
    layer_surface.set_anchor(Anchor::TOP | Anchor::LEFT);
    layer_surface.set_margin(y.max(0), 0, 0, x.max(0));
    layer_surface.set_size(width, height);
    // Take the keyboard while showing so Escape and F6 work before any click
    layer_surface.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);

    // Commit the surface to trigger configure
    layer_surface.commit();
    app.layer_surface = Some(layer_surface);

    let mut event_loop: EventLoop<WaylandApp> =
        EventLoop::try_new().context("Failed to create event loop")?;
    let loop_handle = event_loop.handle();

    WaylandSource::new(conn.clone(), event_queue)
        .insert(loop_handle.clone())
        .map_err(|e| anyhow!("Failed to register Wayland event source: {}", e.error))?;

    loop_handle
        .insert_source(Timer::from_duration(tick), move |_deadline, _, app| {
            app.dispatch(Event::Tick);
            app.release_keyboard_grab();
            if app.should_exit || !app.window.is_active() {
                TimeoutAction::Drop
            } else {
                TimeoutAction::ToDuration(tick)
            }
        })
        .map_err(|e| anyhow!("Failed to register tick timer: {}", e.error))?;

    info!("Starting event loop (tick every {:?})", tick);
    info!("Controls: drag to throw, F6 to change background, Escape to close");

    while !app.should_exit {
        event_loop
            .dispatch(tick, &mut app)
            .context("Event loop dispatch failed")?;
    }

    info!("Exiting application");
    Ok(())
}

/// Usable area of `output`, or `None` until it has reported any geometry
fn output_bounds(output_state: &OutputState, output: &wl_output::WlOutput) -> Option<Bounds> {
    let info = output_state.info(output)?;
    let current_mode = info
        .modes
        .iter()
        .find(|m| m.current)
        .map(|m| m.dimensions);
    bounds_from_geometry(info.logical_size, current_mode)
}

/// Logical size wins over the raw mode, which ignores scaling
fn bounds_from_geometry(
    logical_size: Option<(i32, i32)>,
    current_mode: Option<(i32, i32)>,
) -> Option<Bounds> {
    logical_size
        .or(current_mode)
        .filter(|&(w, h)| w > 0 && h > 0)
        .map(|(w, h)| Bounds::new(0.0, 0.0, w as f32, h as f32))
}

fn first_measured_output(output_state: &OutputState) -> Option<wl_output::WlOutput> {
    output_state
        .outputs()
        .find(|output| output_bounds(output_state, output).is_some())
}

/// Bounds of the window's output, falling back to any measured output
fn display_bounds(output_state: &OutputState, current: Option<&wl_output::WlOutput>) -> Bounds {
    choose_bounds(
        current,
        output_state
            .outputs()
            .map(|output| {
                let bounds = output_bounds(output_state, &output);
                (output, bounds)
            }),
    )
}

fn choose_bounds<O: PartialEq>(
    current: Option<&O>,
    outputs: impl IntoIterator<Item = (O, Option<Bounds>)>,
) -> Bounds {
    let mut first = None;
    for (output, bounds) in outputs {
        let Some(bounds) = bounds else { continue };
        if current == Some(&output) {
            return bounds;
        }
        first.get_or_insert(bounds);
    }
    first.unwrap_or(FALLBACK_BOUNDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_blit_converts_to_bgra() {
        let surface = RgbaImage::from_pixel(2, 2, Rgba([255, 128, 0, 255]));
        let mut canvas = vec![0u8; 2 * 2 * 4];
        blit_surface(&surface, &mut canvas, 2, 2, 1.0);
        assert_eq!(&canvas[0..4], &[0, 128, 255, 255]);
    }

    #[test]
    fn test_blit_premultiplies_opacity() {
        let surface = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let mut canvas = vec![0u8; 4];
        blit_surface(&surface, &mut canvas, 1, 1, 0.5);
        assert_eq!(canvas, vec![128, 128, 128, 128]);

        blit_surface(&surface, &mut canvas, 1, 1, 0.0);
        assert_eq!(canvas, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_blit_stretches_nearest_neighbour() {
        let mut surface = RgbaImage::new(2, 1);
        surface.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        surface.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let mut canvas = vec![0u8; 4 * 2 * 4];
        blit_surface(&surface, &mut canvas, 4, 2, 1.0);

        let red = [0, 0, 255, 255];
        let blue = [255, 0, 0, 255];
        for row in canvas.chunks_exact(16) {
            assert_eq!(&row[0..4], &red);
            assert_eq!(&row[4..8], &red);
            assert_eq!(&row[8..12], &blue);
            assert_eq!(&row[12..16], &blue);
        }
    }

    #[test]
    fn test_bounds_prefer_logical_size() {
        let bounds = bounds_from_geometry(Some((1280, 720)), Some((2560, 1440))).unwrap();
        assert_eq!((bounds.width, bounds.height), (1280.0, 720.0));

        let bounds = bounds_from_geometry(None, Some((1920, 1080))).unwrap();
        assert_eq!((bounds.width, bounds.height), (1920.0, 1080.0));

        assert!(bounds_from_geometry(None, None).is_none());
        assert!(bounds_from_geometry(Some((0, 0)), None).is_none());
    }

    #[test]
    fn test_bounds_follow_the_window_output() {
        let large = Bounds::new(0.0, 0.0, 2560.0, 1440.0);
        let small = Bounds::new(0.0, 0.0, 1920.0, 1080.0);
        let outputs = || vec![("left", Some(large)), ("right", Some(small))];

        assert_eq!(choose_bounds(Some(&"right"), outputs()), small);
        assert_eq!(choose_bounds(Some(&"left"), outputs()), large);
        // Unknown or unset output falls back to the first one with geometry
        assert_eq!(choose_bounds(None, outputs()), large);
        assert_eq!(choose_bounds(Some(&"gone"), outputs()), large);
        assert_eq!(
            choose_bounds(Some(&"right"), vec![("left", None), ("right", Some(small))]),
            small
        );
        assert_eq!(choose_bounds::<&str>(None, vec![]), FALLBACK_BOUNDS);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(Keysym::Escape), Key::Escape);
        assert_eq!(map_key(Keysym::F6), Key::ChooseBackground);
        assert_eq!(map_key(Keysym::q), Key::Other);
    }
}
