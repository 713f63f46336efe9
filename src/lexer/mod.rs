use lachs::Span;

#[lachs::token]
pub enum Token {
    #[terminal("let")]
    Let,
    #[terminal("in")]
    In,
    #[terminal("if")]
    If,
    #[terminal("then")]
    Then,
    #[terminal("else")]
    Else,
    #[terminal("merge")]
    Merge,
    #[terminal("forall")]
    Forall,
    #[terminal("exists")]
    Exists,
    #[terminal("true")]
    True,
    #[terminal("false")]
    False,
    #[terminal("not")]
    Not,
    #[terminal("even")]
    Even,
    #[terminal("odd")]
    Odd,
    #[terminal("length")]
    Length,
    #[terminal("map")]
    Map,
    #[terminal("Bool")]
    BoolType,
    #[terminal("Natural")]
    NaturalType,
    #[terminal("Text")]
    TextType,
    #[terminal("List")]
    ListType,
    #[terminal("Type")]
    TypeKind,
    #[terminal("Fields")]
    FieldsKind,
    #[terminal("Alternatives")]
    AlternativesKind,
    #[literal("[a-zA-Z][a-zA-Z0-9_]*")]
    Ident,
    #[literal("[0-9]+")]
    Natural,
    #[literal(r#""([^"\\]|\\.)*""#)]
    Text,
    #[terminal("\\")]
    Backslash,
    #[terminal("->")]
    Arrow,
    #[terminal(".")]
    Dot,
    #[terminal(",")]
    Comma,
    #[terminal(":")]
    Colon,
    #[terminal("=")]
    Equals,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("[")]
    LBracket,
    #[terminal("]")]
    RBracket,
    #[terminal("{")]
    LBrace,
    #[terminal("}")]
    RBrace,
    #[terminal("<")]
    LAngle,
    #[terminal(">")]
    RAngle,
    #[terminal("|")]
    Bar,
    #[terminal("@")]
    At,
    #[terminal("+")]
    Plus,
    #[terminal("++")]
    Append,
    #[terminal("*")]
    Star,
    #[terminal("&&")]
    And,
    #[terminal("||")]
    Or,
}

impl Token {
    pub fn pos(&self) -> Span {
        match self {
            Token::Let(inner) => inner.position.clone(),
            Token::In(inner) => inner.position.clone(),
            Token::If(inner) => inner.position.clone(),
            Token::Then(inner) => inner.position.clone(),
            Token::Else(inner) => inner.position.clone(),
            Token::Merge(inner) => inner.position.clone(),
            Token::Forall(inner) => inner.position.clone(),
            Token::Exists(inner) => inner.position.clone(),
            Token::True(inner) => inner.position.clone(),
            Token::False(inner) => inner.position.clone(),
            Token::Not(inner) => inner.position.clone(),
            Token::Even(inner) => inner.position.clone(),
            Token::Odd(inner) => inner.position.clone(),
            Token::Length(inner) => inner.position.clone(),
            Token::Map(inner) => inner.position.clone(),
            Token::BoolType(inner) => inner.position.clone(),
            Token::NaturalType(inner) => inner.position.clone(),
            Token::TextType(inner) => inner.position.clone(),
            Token::ListType(inner) => inner.position.clone(),
            Token::TypeKind(inner) => inner.position.clone(),
            Token::FieldsKind(inner) => inner.position.clone(),
            Token::AlternativesKind(inner) => inner.position.clone(),
            Token::Ident(inner) => inner.position.clone(),
            Token::Natural(inner) => inner.position.clone(),
            Token::Text(inner) => inner.position.clone(),
            Token::Backslash(inner) => inner.position.clone(),
            Token::Arrow(inner) => inner.position.clone(),
            Token::Dot(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::Colon(inner) => inner.position.clone(),
            Token::Equals(inner) => inner.position.clone(),
            Token::LParen(inner) => inner.position.clone(),
            Token::RParen(inner) => inner.position.clone(),
            Token::LBracket(inner) => inner.position.clone(),
            Token::RBracket(inner) => inner.position.clone(),
            Token::LBrace(inner) => inner.position.clone(),
            Token::RBrace(inner) => inner.position.clone(),
            Token::LAngle(inner) => inner.position.clone(),
            Token::RAngle(inner) => inner.position.clone(),
            Token::Bar(inner) => inner.position.clone(),
            Token::At(inner) => inner.position.clone(),
            Token::Plus(inner) => inner.position.clone(),
            Token::Append(inner) => inner.position.clone(),
            Token::Star(inner) => inner.position.clone(),
            Token::And(inner) => inner.position.clone(),
            Token::Or(inner) => inner.position.clone(),
        }
    }

    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        match self {
            Token::Let(_) => "'let'".to_string(),
            Token::In(_) => "'in'".to_string(),
            Token::If(_) => "'if'".to_string(),
            Token::Then(_) => "'then'".to_string(),
            Token::Else(_) => "'else'".to_string(),
            Token::Merge(_) => "'merge'".to_string(),
            Token::Forall(_) => "'forall'".to_string(),
            Token::Exists(_) => "'exists'".to_string(),
            Token::True(_) => "'true'".to_string(),
            Token::False(_) => "'false'".to_string(),
            Token::Not(_) => "'not'".to_string(),
            Token::Even(_) => "'even'".to_string(),
            Token::Odd(_) => "'odd'".to_string(),
            Token::Length(_) => "'length'".to_string(),
            Token::Map(_) => "'map'".to_string(),
            Token::BoolType(_) => "'Bool'".to_string(),
            Token::NaturalType(_) => "'Natural'".to_string(),
            Token::TextType(_) => "'Text'".to_string(),
            Token::ListType(_) => "'List'".to_string(),
            Token::TypeKind(_) => "'Type'".to_string(),
            Token::FieldsKind(_) => "'Fields'".to_string(),
            Token::AlternativesKind(_) => "'Alternatives'".to_string(),
            Token::Ident(inner) => format!("identifier '{}'", inner.value),
            Token::Natural(inner) => format!("natural number '{}'", inner.value),
            Token::Text(inner) => format!("text {}", inner.value),
            Token::Backslash(_) => "'\\'".to_string(),
            Token::Arrow(_) => "'->'".to_string(),
            Token::Dot(_) => "'.'".to_string(),
            Token::Comma(_) => "','".to_string(),
            Token::Colon(_) => "':'".to_string(),
            Token::Equals(_) => "'='".to_string(),
            Token::LParen(_) => "'('".to_string(),
            Token::RParen(_) => "')'".to_string(),
            Token::LBracket(_) => "'['".to_string(),
            Token::RBracket(_) => "']'".to_string(),
            Token::LBrace(_) => "'{'".to_string(),
            Token::RBrace(_) => "'}'".to_string(),
            Token::LAngle(_) => "'<'".to_string(),
            Token::RAngle(_) => "'>'".to_string(),
            Token::Bar(_) => "'|'".to_string(),
            Token::At(_) => "'@'".to_string(),
            Token::Plus(_) => "'+'".to_string(),
            Token::Append(_) => "'++'".to_string(),
            Token::Star(_) => "'*'".to_string(),
            Token::And(_) => "'&&'".to_string(),
            Token::Or(_) => "'||'".to_string(),
        }
    }
}
