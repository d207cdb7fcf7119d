use iced::keyboard::{self, key, Key};
use iced::widget::image::Handle;
use iced::widget::{button, canvas, column, container, row, stack, text, text_input, Column};
use iced::{Alignment, Element, Length, Point, Subscription, Task, Theme};
use rfd::FileDialog;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

mod capture;
mod compositor;
mod config;
mod error;
mod grid;
mod histogram;
mod logging;
mod minimap;
mod navigator;
mod observe;
mod scan;
mod thumbnail;
mod ui;

#[cfg(test)]
mod fixtures;

use capture::{Annotation, CaptureReceipt, CaptureRequest, CaptureStore};
use config::Settings;
use histogram::Histogram;
use minimap::Minimap;
use observe::Change;

/// Main application state
struct MinimapApp {
    minimap: Minimap,
    settings: Settings,
    store: CaptureStore,
    /// Last rendered composite
    frame: Handle,
    /// Set by minimap notifications, cleared once handled
    redraw: Rc<Cell<bool>>,
    selection: Rc<Cell<bool>>,
    histogram: Histogram,
    status: String,
    label: String,
    quality: String,
    /// Marked box on the selected tile: x1, y1, x2, y2 in image pixels
    box_fields: [String; 4],
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Open Scan"
    PickFolder,
    /// Thumbnail sweep timer
    Tick,
    /// Click on the minimap, in display coordinates
    Clicked(Point),
    /// Arrow key, as a field offset
    Step(i32, i32),
    /// Next tile in scan order
    Advance,
    LabelChanged(String),
    QualityChanged(String),
    /// One of the four box coordinates was edited
    BoxChanged(usize, String),
    Capture,
    CaptureComplete(Result<CaptureReceipt, String>),
}

impl MinimapApp {
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let mut minimap = Minimap::new(
            settings.thumbnail_width,
            settings.viewport_width,
            settings.viewport_height,
        );

        let redraw = Rc::new(Cell::new(true));
        let selection = Rc::new(Cell::new(false));
        {
            let redraw = Rc::clone(&redraw);
            let selection = Rc::clone(&selection);
            minimap.subscribe(move |change| match change {
                Change::Redraw => redraw.set(true),
                Change::ImagePath => selection.set(true),
                _ => {}
            });
        }

        let store = CaptureStore::new(settings.capture_dir());
        tracing::info!(captures = %store.copied_images_dir().display(), "minimap ready");

        let mut app = MinimapApp {
            minimap,
            settings,
            store,
            frame: Handle::from_rgba(1, 1, vec![0u8; 4]),
            redraw,
            selection,
            histogram: Histogram::default(),
            status: "Open a tile scan to begin.".to_string(),
            label: String::new(),
            quality: String::new(),
            box_fields: Default::default(),
        };
        app.refresh();

        (app, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::PickFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Tile Scan Folder")
                    .pick_folder();

                if let Some(folder) = folder {
                    self.open_scan(&folder);
                }
                Task::none()
            }
            Message::Tick => {
                self.minimap.tick();
                Task::none()
            }
            Message::Clicked(position) => {
                self.minimap.click(position.x as f64, position.y as f64);
                Task::none()
            }
            Message::Step(dx, dy) => {
                self.minimap.move_by(dx, dy);
                Task::none()
            }
            Message::Advance => {
                self.minimap.advance();
                Task::none()
            }
            Message::LabelChanged(label) => {
                self.label = label;
                Task::none()
            }
            Message::QualityChanged(quality) => {
                self.quality = quality;
                Task::none()
            }
            Message::BoxChanged(i, value) => {
                if let Some(field) = self.box_fields.get_mut(i) {
                    *field = value;
                }
                Task::none()
            }
            Message::Capture => self.capture(),
            Message::CaptureComplete(result) => {
                self.status = match result {
                    Ok(receipt) => format!(
                        "Saved {} and {}",
                        receipt.record.display(),
                        receipt.view.display()
                    ),
                    Err(e) => {
                        tracing::error!("capture failed: {e}");
                        format!("Capture failed: {e}")
                    }
                };
                Task::none()
            }
        };

        self.refresh();
        task
    }

    fn open_scan(&mut self, folder: &std::path::Path) {
        match self.minimap.load(folder) {
            Ok(warnings) => {
                self.status = format!(
                    "Loaded {} tiles from {}",
                    self.minimap.grid().len(),
                    folder.display()
                );
                for warning in warnings {
                    self.status.push_str(&format!("\nWarning: {warning}"));
                }
            }
            Err(e) => {
                tracing::error!("failed to open scan: {e}");
                self.status = format!("Could not open scan: {e}");
            }
        }
    }

    /// Save the selected tile, the marked box and the current view
    fn capture(&mut self) -> Task<Message> {
        let Some(image_path) = self.minimap.image_path().map(|p| p.to_path_buf()) else {
            self.status = "Nothing selected.".to_string();
            return Task::none();
        };
        if self.label.trim().is_empty() {
            self.status = "Enter a label before capturing.".to_string();
            return Task::none();
        }

        let grid = self.minimap.grid();
        let (top_left, bot_right) = match capture::parse_box(
            &self.box_fields,
            grid.axis_x().pixel_count as f64,
            grid.axis_y().pixel_count as f64,
        ) {
            Ok(corners) => corners,
            Err(e) => {
                self.status = e.to_string();
                return Task::none();
            }
        };

        let request = CaptureRequest {
            image_path,
            prefix: self.minimap.scan_name().unwrap_or("scan").to_string(),
            view: compositor::render(&self.minimap),
            annotation: Annotation {
                top_left,
                bot_right,
                label: self.label.trim().to_string(),
                quality: self.quality.trim().to_string(),
            },
        };

        self.status = format!("Capturing {}...", request.image_path.display());
        Task::perform(
            capture::save_in_background(self.store.clone(), request),
            Message::CaptureComplete,
        )
    }

    /// Act on whatever the minimap reported since the last message
    fn refresh(&mut self) {
        if self.redraw.replace(false) {
            let composite = compositor::render(&self.minimap);
            let (width, height) = composite.dimensions();
            self.frame = Handle::from_rgba(width, height, composite.into_raw());
        }

        if self.selection.replace(false) {
            self.histogram = match self.minimap.image_path() {
                Some(path) => Histogram::from_path(path).unwrap_or_else(|e| {
                    tracing::warn!("{e}");
                    Histogram::default()
                }),
                None => Histogram::default(),
            };
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, _modifiers| match key.as_ref() {
            Key::Named(key::Named::ArrowLeft) => Some(Message::Step(-1, 0)),
            Key::Named(key::Named::ArrowRight) => Some(Message::Step(1, 0)),
            Key::Named(key::Named::ArrowUp) => Some(Message::Step(0, -1)),
            Key::Named(key::Named::ArrowDown) => Some(Message::Step(0, 1)),
            Key::Named(key::Named::Space) | Key::Character("n") => Some(Message::Advance),
            _ => None,
        });

        if self.minimap.sweep_active() {
            let interval = Duration::from_millis(self.settings.sweep_interval_ms.max(1));
            Subscription::batch([keys, iced::time::every(interval).map(|_| Message::Tick)])
        } else {
            keys
        }
    }

    fn view(&self) -> Element<Message> {
        let width = Length::Fixed(self.minimap.display_width().ceil().max(1.0) as f32);
        let height = Length::Fixed(self.minimap.viewport_height().ceil().max(1.0) as f32);

        let map = stack![
            iced::widget::image(self.frame.clone()).width(width).height(height),
            canvas(ui::ClickLayer).width(width).height(height),
        ];

        let (swept, total) = self.minimap.sweep_progress();
        let box_inputs = ["x1", "y1", "x2", "y2"].into_iter().enumerate().fold(
            row![].spacing(6),
            |inputs, (i, placeholder)| {
                inputs.push(
                    text_input(placeholder, &self.box_fields[i])
                        .on_input(move |value| Message::BoxChanged(i, value))
                        .width(Length::Fixed(70.0)),
                )
            },
        );

        let selected = match self.minimap.image_path() {
            Some(path) => path.display().to_string(),
            None => "none".to_string(),
        };

        let panel: Column<Message> = column![
            button("Open Scan").on_press(Message::PickFolder).padding(10),
            text(format!("Loaded: {}", self.minimap.is_loaded())).size(14),
            text(format!("Thumbnails: {} / {}", swept, total)).size(14),
            text(format!("Image: {selected}")).size(14),
            text(format!(
                "Position: {:.6}, {:.6}",
                self.minimap.position_x(),
                self.minimap.position_y()
            ))
            .size(14),
            text(format!(
                "Scan: {:.6} x {:.6}",
                self.minimap.total_width(),
                self.minimap.total_height()
            ))
            .size(14),
            text(format!(
                "Tile: {:.6} x {:.6}",
                self.minimap.image_width(),
                self.minimap.image_height()
            ))
            .size(14),
            canvas(self.histogram.clone())
                .width(Length::Fixed(200.0))
                .height(Length::Fixed(100.0)),
            text_input("Label", &self.label).on_input(Message::LabelChanged),
            text_input("Quality", &self.quality).on_input(Message::QualityChanged),
            text("Box (pixels, blank = whole tile)").size(14),
            box_inputs,
            row![
                button("Next").on_press(Message::Advance).padding(10),
                button("Capture").on_press(Message::Capture).padding(10),
            ]
            .spacing(10),
            text(&self.status).size(14),
        ]
        .spacing(12)
        .width(Length::Fixed(320.0));

        let content = row![map, panel]
            .spacing(20)
            .padding(20)
            .align_y(Alignment::Start);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    logging::init();

    iced::application("Leica Minimap", MinimapApp::update, MinimapApp::view)
        .subscription(MinimapApp::subscription)
        .theme(MinimapApp::theme)
        .centered()
        .run_with(MinimapApp::new)
}
