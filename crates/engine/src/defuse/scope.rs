use parsers::SignatureCatalog;

/// How a name used in a statement was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Formal parameter at this position.
    Param(usize),
    Local,
    /// Field of the innermost class, `this.` stripped.
    Field(String),
    /// Field of an enclosing class.
    OuterField,
    Unresolved,
}

#[derive(Debug, Clone)]
struct Variable {
    name: String,
    ty: String,
}

/// Names visible at the current point of the walk.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    params: Vec<Variable>,
    frames: Vec<Vec<Variable>>,
    /// Enclosing classes, innermost first.
    classes: Vec<String>,
}

impl Scope {
    /// Resets the scope for a new method-like member.
    pub fn enter(&mut self, params: Vec<(String, String)>, classes: Vec<String>) {
        self.params = params
            .into_iter()
            .map(|(name, ty)| Variable { name, ty })
            .collect();
        self.frames.clear();
        self.classes = classes;
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class(&self) -> Option<&str> {
        self.classes.first().map(String::as_str)
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn declare(&mut self, name: &str, ty: &str) {
        if self.frames.is_empty() {
            self.frames.push(Vec::new());
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push(Variable {
                name: name.to_string(),
                ty: ty.to_string(),
            });
        }
    }

    fn local(&self, name: &str) -> Option<&Variable> {
        self.frames
            .iter()
            .rev()
            .flat_map(|f| f.iter().rev())
            .find(|v| v.name == name)
    }

    /// Resolution order: parameter, local (innermost first), field of the
    /// innermost class, field of any enclosing class.
    pub fn resolve(&self, catalog: &SignatureCatalog, name: &str) -> Resolution {
        if let Some(pos) = self.params.iter().position(|p| p.name == name) {
            return Resolution::Param(pos);
        }
        if self.local(name).is_some() {
            return Resolution::Local;
        }
        let field = name.strip_prefix("this.").unwrap_or(name);
        if let Some(class) = self.class() {
            if catalog.fields_of(class).iter().any(|f| f.name == field) {
                return Resolution::Field(field.to_string());
            }
        }
        if self
            .classes
            .iter()
            .any(|c| catalog.fields_of(c).iter().any(|f| f.name == field))
        {
            return Resolution::OuterField;
        }
        Resolution::Unresolved
    }

    /// Declared type of a parameter, local or field.
    pub fn type_of(&self, catalog: &SignatureCatalog, name: &str) -> Option<String> {
        if let Some(p) = self.params.iter().find(|p| p.name == name) {
            return Some(p.ty.clone());
        }
        if let Some(v) = self.local(name) {
            return Some(v.ty.clone());
        }
        let field = name.strip_prefix("this.").unwrap_or(name);
        self.classes.iter().find_map(|c| {
            catalog
                .fields_of(c)
                .into_iter()
                .find(|f| f.name == field)
                .map(|f| f.ty.clone())
        })
    }
}
