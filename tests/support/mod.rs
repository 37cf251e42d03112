//! 测试用的内存门户
//!
//! 按 `PortalConfig::default()` 生成的定位方式响应页面操作，
//! 模拟语言切换、验证码登录、学院/系下拉框和分页表格

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use seat_watch::error::BrowserError;
use seat_watch::services::SolverFn;
use seat_watch::{Locator, PortalConfig, PortalDriver};

pub const USERNAME: &str = "student";
pub const PASSWORD: &str = "secret";
pub const CAPTCHA: &str = "A1B2";

/// 表格中的一行
#[derive(Debug, Clone)]
pub struct Row {
    pub course_id: String,
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(course_id: &str, section: u32, status: &str) -> Self {
        let mut cells = vec![String::new(); 14];
        cells[0] = course_id.to_string();
        cells[1] = format!("Course {}", course_id);
        cells[3] = section.to_string();
        cells[12] = status.to_string();
        Self {
            course_id: course_id.to_string(),
            cells,
        }
    }

    pub fn open(course_id: &str, section: u32) -> Self {
        Self::new(course_id, section, "Opened")
    }

    pub fn closed(course_id: &str, section: u32) -> Self {
        Self::new(course_id, section, "Closed")
    }
}

#[derive(Debug, Default)]
pub struct PortalState {
    pub english: bool,
    pub logged_in: bool,
    pub current_url: String,
    pub typed: HashMap<usize, String>,
    pub submits: usize,
    pub screenshots: usize,
    pub selections: Vec<(usize, usize)>,
    pub pages: Vec<Vec<Row>>,
    pub current_page: usize,
    pub page_clicks: usize,
    /// 接下来多少次打开开课查询页会失败（元素失效）
    pub schedule_failures: usize,
    pub schedule_visits: usize,
}

pub struct FakePortal {
    pub portal: PortalConfig,
    pub state: Mutex<PortalState>,
}

impl FakePortal {
    /// 未登录、中文界面、没有课程
    pub fn new() -> Self {
        Self {
            portal: PortalConfig::default(),
            state: Mutex::new(PortalState::default()),
        }
    }

    pub fn logged_in(self) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.english = true;
            state.logged_in = true;
        }
        self
    }

    pub fn with_pages(self, pages: Vec<Vec<Row>>) -> Self {
        self.state.lock().unwrap().pages = pages;
        self
    }

    pub fn failing_schedule(self, times: usize) -> Self {
        self.state.lock().unwrap().schedule_failures = times;
        self
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&PortalState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    fn row_course(&self, locator: &Locator, state: &PortalState) -> Option<String> {
        state
            .pages
            .iter()
            .flatten()
            .map(|row| row.course_id.clone())
            .find(|id| self.portal.course_rows(id) == *locator)
    }

    fn rows_on_page<'a>(state: &'a PortalState, course_id: &str) -> Vec<&'a Row> {
        state
            .pages
            .get(state.current_page)
            .map(|rows| rows.iter().filter(|r| r.course_id == course_id).collect())
            .unwrap_or_default()
    }
}

fn not_found(locator: &Locator, nth: usize) -> BrowserError {
    BrowserError::ElementNotFound {
        locator: locator.to_string(),
        nth,
    }
}

#[async_trait]
impl PortalDriver for FakePortal {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        if url == self.portal.schedule_url {
            state.schedule_visits += 1;
            if state.schedule_failures > 0 {
                state.schedule_failures -= 1;
                return Err(BrowserError::StaleElement("schedule table".to_string()));
            }
        }
        state.current_url = url.to_string();
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError> {
        let state = self.state.lock().unwrap();
        let portal = &self.portal;

        if *locator == portal.language_switch() {
            return Ok(usize::from(!state.english));
        }
        if *locator == portal.captcha_image() {
            return Ok(usize::from(!state.logged_in));
        }
        if *locator == portal.paginator() {
            return Ok(usize::from(state.pages.len() > 1));
        }
        if *locator == portal.paginator_pages() {
            return Ok(if state.pages.len() > 1 { state.pages.len() } else { 0 });
        }
        let rows = match self.row_course(locator, &state) {
            Some(course_id) => Self::rows_on_page(&state, &course_id).len(),
            None => 0,
        };
        Ok(rows)
    }

    async fn click(&self, locator: &Locator, nth: usize) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let portal = &self.portal;

        if *locator == portal.language_switch() && !state.english {
            state.english = true;
        } else if *locator == portal.submit_button() {
            state.submits += 1;
            let typed = std::mem::take(&mut state.typed);
            let field = |i: usize| typed.get(&i).map(String::as_str);
            state.logged_in = field(portal.username_field) == Some(USERNAME)
                && field(portal.password_field) == Some(PASSWORD)
                && field(portal.captcha_field) == Some(CAPTCHA);
        } else if *locator == portal.paginator_pages() && nth < state.pages.len() {
            state.current_page = nth;
            state.page_clicks += 1;
        } else {
            return Err(not_found(locator, nth));
        }
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, nth: usize, text: &str) -> Result<(), BrowserError> {
        if *locator != self.portal.login_inputs() {
            return Err(not_found(locator, nth));
        }
        self.state
            .lock()
            .unwrap()
            .typed
            .insert(nth, text.to_string());
        Ok(())
    }

    async fn select_option(
        &self,
        locator: &Locator,
        nth: usize,
        option: usize,
    ) -> Result<(), BrowserError> {
        if *locator != self.portal.dropdowns() {
            return Err(not_found(locator, nth));
        }
        let mut state = self.state.lock().unwrap();
        state.selections.push((nth, option));
        state.current_page = 0;
        Ok(())
    }

    async fn read_texts(&self, locator: &Locator, nth: usize) -> Result<Vec<String>, BrowserError> {
        let state = self.state.lock().unwrap();
        let course_id = self
            .row_course(locator, &state)
            .ok_or_else(|| not_found(locator, nth))?;
        let cells = Self::rows_on_page(&state, &course_id)
            .get(nth)
            .map(|row| row.cells.clone());
        cells.ok_or_else(|| not_found(locator, nth))
    }

    async fn screenshot(&self, locator: &Locator, nth: usize) -> Result<Vec<u8>, BrowserError> {
        if *locator != self.portal.captcha_image() {
            return Err(not_found(locator, nth));
        }
        self.state.lock().unwrap().screenshots += 1;

        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 40, Luma([255])));
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| BrowserError::StaleElement(e.to_string()))?;
        Ok(png.into_inner())
    }
}

/// 按顺序给出答案的识别器，答案用完后一直返回正确答案
pub fn scripted_solver(
    answers: &[&str],
) -> (Arc<SolverFn<impl Fn(&DynamicImage) -> String + Send + Sync>>, Arc<Mutex<usize>>) {
    let queue: Mutex<VecDeque<String>> =
        Mutex::new(answers.iter().map(|a| a.to_string()).collect());
    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();

    let solver = SolverFn(move |_image: &DynamicImage| {
        *counter.lock().unwrap() += 1;
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CAPTCHA.to_string())
    });
    (Arc::new(solver), calls)
}
