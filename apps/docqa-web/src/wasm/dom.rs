use super::*;

/// The current page's DOM. Elements a page does not have are skipped.
pub(super) struct DomSurface {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl DomSurface {
    pub(super) fn current() -> Result<Self, String> {
        let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
        let document = window
            .document()
            .ok_or_else(|| "document is unavailable".to_string())?;
        Ok(Self { window, document })
    }

    fn slot(&self, slot: Slot) -> Option<Element> {
        self.document.get_element_by_id(slot_element_id(slot))
    }

    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    }

    fn append(&self, parent: &Element, tag: &str, text: &str) -> Result<Element, JsValue> {
        let child = self.document.create_element(tag)?;
        child.set_text_content(Some(text));
        parent.append_child(&child)?;
        Ok(child)
    }

    fn fill_answer(&self, target: &Element, panel: &AnswerPanel) -> Result<(), JsValue> {
        target.set_inner_html("");
        for (label, value) in panel.rows() {
            match label {
                Some(label) => {
                    let row = self.document.create_element("p")?;
                    self.append(&row, "strong", label)?;
                    row.append_with_str_1(&format!(" {value}"))?;
                    target.append_child(&row)?;
                }
                None => {
                    self.append(target, "p", &value)?;
                }
            }
        }
        Ok(())
    }

    fn selected_files(&self) -> Vec<File> {
        let Some(list) = self.input(FILE_INPUT_ID).and_then(|input| input.files()) else {
            return Vec::new();
        };
        (0..list.length()).filter_map(|index| list.get(index)).collect()
    }
}

#[async_trait(?Send)]
impl PageSurface for DomSurface {
    fn set_text(&self, slot: Slot, text: &str) {
        if let Some(element) = self.slot(slot) {
            element.set_text_content(Some(text));
        }
    }

    fn set_list(&self, slot: Slot, items: &[String]) {
        let Some(list) = self.slot(slot) else {
            return;
        };
        list.set_inner_html("");
        for item in items {
            if let Err(error) = self.append(&list, "li", item) {
                log_error("render list", &js_error_message(&error));
                return;
            }
        }
    }

    fn render_answer(&self, panel: &AnswerPanel) {
        let Some(target) = self.slot(Slot::Response) else {
            return;
        };
        if let Err(error) = self.fill_answer(&target, panel) {
            log_error("render answer", &js_error_message(&error));
        }
    }

    fn input_value(&self, slot: Slot) -> String {
        self.input(slot_element_id(slot))
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn clear_input(&self, slot: Slot) {
        if let Some(input) = self.input(slot_element_id(slot)) {
            input.set_value("");
        }
    }

    fn selected_file_count(&self) -> usize {
        self.input(FILE_INPUT_ID)
            .and_then(|input| input.files())
            .map_or(0, |list| list.length() as usize)
    }

    async fn read_selected_files(&self) -> Result<Vec<UploadFile>, String> {
        let mut files = Vec::new();
        for file in self.selected_files() {
            let buffer = JsFuture::from(file.array_buffer())
                .await
                .map_err(|error| format!("{}: {}", file.name(), js_error_message(&error)))?;
            let content_type = file.type_();
            files.push(UploadFile {
                file_name: file.name(),
                content_type: (!content_type.is_empty()).then_some(content_type),
                bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
            });
        }
        Ok(files)
    }

    fn alert(&self, message: &str) {
        if self.window.alert_with_message(message).is_err() {
            log_error("alert", message);
        }
    }

    fn navigate(&self, page: Page) {
        if let Err(error) = self.window.location().set_href(page.path()) {
            log_error("navigate", &js_error_message(&error));
        }
    }
}

/// Attaches `handler` to `#id`. A page without that button keeps starting up.
pub(super) fn bind_click(id: &str, mut handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("document is unavailable"))?;
    attach_if_present(id, document.get_element_by_id(id), |element| {
        let callback =
            Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| handler()));
        element.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
        CLICK_HANDLERS.with(|handlers| handlers.borrow_mut().push(callback));
        Ok(())
    })?;
    Ok(())
}
